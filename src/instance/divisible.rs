//! Instances for the divisible (continuous) path.

use super::valuations::Valuations;
use crate::error::{AllocError, AllocResult};
use crate::normalize::Normalizer;

/// Agents sharing divisible items, one unit of each.
///
/// Holds the normalized preferences the solvers work on, together with the
/// entitlements they were derived from. Read-only once constructed.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DivisibleInstance {
    preferences: Valuations,
    entitlements: Vec<f64>,
}

impl DivisibleInstance {
    /// Normalizes `raw` against `entitlements` and builds the instance.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_fairalloc::instance::{DivisibleInstance, Valuations};
    /// use u_fairalloc::normalize::{NormalizationTarget, Normalizer, NormalizerConfig};
    ///
    /// let raw = Valuations::new(
    ///     vec!["a".into(), "b".into()],
    ///     vec!["x".into(), "y".into()],
    ///     vec![vec![1.0, 3.0], vec![1.0, 1.0]],
    /// )
    /// .unwrap();
    /// let normalizer = Normalizer::new(
    ///     NormalizerConfig::default().with_target(NormalizationTarget::TotalEntitlement),
    /// )
    /// .unwrap();
    /// let instance = DivisibleInstance::new(&raw, vec![1.0, 1.0], &normalizer).unwrap();
    /// assert_eq!(instance.preferences().row(0), &[0.5, 1.5]);
    /// ```
    pub fn new(
        raw: &Valuations,
        entitlements: Vec<f64>,
        normalizer: &Normalizer,
    ) -> AllocResult<Self> {
        let preferences = normalizer.normalize(raw, &entitlements)?;
        let entitlements = if entitlements.is_empty() {
            vec![1.0; raw.num_agents()]
        } else {
            entitlements
        };
        Ok(Self {
            preferences,
            entitlements,
        })
    }

    /// Wraps preferences that are already normalized. Every agent gets
    /// entitlement 1.
    pub fn from_preferences(preferences: Valuations) -> AllocResult<Self> {
        if let Some(a) = preferences.first_null_agent() {
            return Err(AllocError::DegenerateInput(format!(
                "agent {:?} has no positive valuation",
                preferences.agents()[a]
            )));
        }
        let entitlements = vec![1.0; preferences.num_agents()];
        Ok(Self {
            preferences,
            entitlements,
        })
    }

    pub fn preferences(&self) -> &Valuations {
        &self.preferences
    }

    pub fn entitlements(&self) -> &[f64] {
        &self.entitlements
    }

    pub fn agents(&self) -> &[String] {
        self.preferences.agents()
    }

    pub fn items(&self) -> &[String] {
        self.preferences.items()
    }

    pub fn num_agents(&self) -> usize {
        self.preferences.num_agents()
    }

    pub fn num_items(&self) -> usize {
        self.preferences.num_items()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::NormalizerConfig;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_from_preferences_rejects_null_agent() {
        let prefs =
            Valuations::new(ids(&["a", "b"]), ids(&["x"]), vec![vec![1.0], vec![0.0]]).unwrap();
        assert!(DivisibleInstance::from_preferences(prefs).is_err());
    }

    #[test]
    fn test_fixed_sum_fills_entitlements() {
        let raw = Valuations::new(ids(&["a"]), ids(&["x"]), vec![vec![2.0]]).unwrap();
        let normalizer = Normalizer::new(NormalizerConfig::fixed_sum(10.0)).unwrap();
        let instance = DivisibleInstance::new(&raw, vec![], &normalizer).unwrap();
        assert_eq!(instance.entitlements(), &[1.0]);
        assert_eq!(instance.preferences().row(0), &[10.0]);
    }

    #[test]
    fn test_new_rejects_negative_entitlement() {
        let raw = Valuations::new(ids(&["a"]), ids(&["x"]), vec![vec![2.0]]).unwrap();
        let err = DivisibleInstance::new(&raw, vec![-1.0], &Normalizer::default()).unwrap_err();
        assert!(matches!(err, AllocError::DegenerateInput(_)));
    }
}
