//! Preference normalization.

use super::config::{NormalizationTarget, NormalizerConfig, Rounding};
use crate::error::{AllocError, AllocResult};
use crate::instance::Valuations;
use tracing::debug;

/// Rescales raw valuations so every agent's values sum to its target.
///
/// Within an agent the relative order of item values is preserved. The
/// ratio `target / current_sum` is computed first and then applied to each
/// value, so truncated and rounded outputs are reproducible bit for bit.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: NormalizerConfig,
}

impl Normalizer {
    /// Creates a normalizer, validating the configuration.
    pub fn new(config: NormalizerConfig) -> AllocResult<Self> {
        config.validate().map_err(AllocError::InvalidConfig)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Per-agent target sum for an agent with `entitlement` out of `total`.
    pub fn target_sum(&self, entitlement: f64, total: f64) -> f64 {
        match self.config.target {
            NormalizationTarget::FixedSum(sum) => sum,
            NormalizationTarget::TotalEntitlement => total,
            NormalizationTarget::EntitlementAdjusted => total / (entitlement + self.config.epsilon),
        }
    }

    /// Normalizes `raw`.
    ///
    /// `entitlements` is parallel to the agents of `raw`; it may be empty
    /// when the target is a [`NormalizationTarget::FixedSum`].
    ///
    /// # Errors
    ///
    /// [`AllocError::DegenerateInput`] when an entitlement is missing, zero,
    /// negative or non-finite, or when an agent's values sum to zero before
    /// or after rounding.
    pub fn normalize(&self, raw: &Valuations, entitlements: &[f64]) -> AllocResult<Valuations> {
        let uses_entitlements = self.config.target.uses_entitlements();
        if uses_entitlements {
            check_entitlements(raw.agents(), entitlements)?;
        }
        let total: f64 = if uses_entitlements {
            entitlements.iter().sum()
        } else {
            0.0
        };

        let mut values = Vec::with_capacity(raw.num_agents());
        for (a, agent) in raw.agents().iter().enumerate() {
            let current = raw.agent_total(a);
            if current <= 0.0 {
                return Err(AllocError::DegenerateInput(format!(
                    "agent {agent:?} has no positive valuation"
                )));
            }
            let entitlement = if uses_entitlements { entitlements[a] } else { 1.0 };
            let ratio = self.target_sum(entitlement, total) / current;
            let row: Vec<f64> = raw
                .row(a)
                .iter()
                .map(|&v| apply_rounding(v * ratio, self.config.rounding))
                .collect();

            let new_sum: f64 = row.iter().sum();
            if new_sum <= 0.0 {
                return Err(AllocError::DegenerateInput(format!(
                    "agent {agent:?} has no positive valuation after rounding"
                )));
            }
            debug!(
                agent = %agent,
                raw_sum = current,
                normalized_sum = new_sum,
                "normalized preferences"
            );
            values.push(row);
        }
        Ok(raw.with_values(values))
    }
}

fn check_entitlements(agents: &[String], entitlements: &[f64]) -> AllocResult<()> {
    if entitlements.len() != agents.len() {
        return Err(AllocError::DegenerateInput(format!(
            "{} entitlements for {} agents",
            entitlements.len(),
            agents.len()
        )));
    }
    for (agent, &e) in agents.iter().zip(entitlements) {
        if !(e.is_finite() && e > 0.0) {
            return Err(AllocError::DegenerateInput(format!(
                "agent {agent:?} has entitlement {e}"
            )));
        }
    }
    Ok(())
}

fn apply_rounding(value: f64, rounding: Rounding) -> f64 {
    match rounding {
        Rounding::Exact => value,
        Rounding::Decimals(d) => round_decimals(value, d),
        Rounding::Truncate => value.trunc(),
    }
}

/// Rounds half-to-even to `digits` decimal places, mapping `-0.0` to `0.0`.
pub fn round_decimals(value: f64, digits: u32) -> f64 {
    let scale = 10f64.powi(digits as i32);
    let rounded = (value * scale).round_ties_even() / scale;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn parliament() -> (Valuations, Vec<f64>) {
        let raw = Valuations::new(
            ids(&["likkud", "religious", "shas", "aguda"]),
            ids(&[
                "foreign", "defence", "finance", "police", "justice", "interior", "health",
                "educations",
            ]),
            vec![
                vec![20.0, 20.0, 20.0, 10.0, 10.0, 10.0, 10.0, 20.0],
                vec![10.0, 20.0, 10.0, 30.0, 20.0, 10.0, 20.0, 20.0],
                vec![5.0, 5.0, 20.0, 5.0, 10.0, 30.0, 20.0, 20.0],
                vec![5.0, 5.0, 5.0, 5.0, 5.0, 10.0, 20.0, 20.0],
            ],
        )
        .unwrap();
        (raw, vec![32.0, 14.0, 11.0, 7.0])
    }

    #[test]
    fn test_entitlement_adjusted_parliament() {
        let (raw, entitlements) = parliament();
        let normalized = Normalizer::default().normalize(&raw, &entitlements).unwrap();

        assert_eq!(
            normalized.row(0),
            &[0.333, 0.333, 0.333, 0.167, 0.167, 0.167, 0.167, 0.333]
        );
        assert_eq!(
            normalized.row(1),
            &[0.327, 0.653, 0.327, 0.98, 0.653, 0.327, 0.653, 0.653]
        );
        assert_eq!(
            normalized.row(2),
            &[0.253, 0.253, 1.012, 0.253, 0.506, 1.518, 1.012, 1.012]
        );
        assert_eq!(
            normalized.row(3),
            &[0.609, 0.609, 0.609, 0.609, 0.609, 1.219, 2.438, 2.438]
        );
    }

    #[test]
    fn test_total_entitlement_target() {
        let (raw, entitlements) = parliament();
        let normalizer = Normalizer::new(
            NormalizerConfig::default()
                .with_target(NormalizationTarget::TotalEntitlement)
                .with_rounding(Rounding::Exact),
        )
        .unwrap();
        let normalized = normalizer.normalize(&raw, &entitlements).unwrap();
        for a in 0..normalized.num_agents() {
            assert!((normalized.agent_total(a) - 64.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_fixed_sum_truncates() {
        let raw = Valuations::new(
            ids(&["s1", "s5"]),
            ids(&["c1", "c2", "c3", "c4"]),
            vec![
                vec![64.0, 34.0, 167.0, 132.0],
                vec![171.0, 115.0, 4.0, 157.0],
            ],
        )
        .unwrap();
        let normalizer = Normalizer::new(NormalizerConfig::fixed_sum(1000.0)).unwrap();
        let normalized = normalizer.normalize(&raw, &[]).unwrap();
        assert_eq!(normalized.row(0), &[161.0, 85.0, 420.0, 332.0]);
        assert_eq!(normalized.row(1), &[382.0, 257.0, 8.0, 351.0]);
    }

    #[test]
    fn test_preserves_order_within_agent() {
        let (raw, entitlements) = parliament();
        let normalizer = Normalizer::new(
            NormalizerConfig::default().with_rounding(Rounding::Exact),
        )
        .unwrap();
        let normalized = normalizer.normalize(&raw, &entitlements).unwrap();
        for a in 0..raw.num_agents() {
            for i in 0..raw.num_items() {
                for j in 0..raw.num_items() {
                    if raw.value(a, i) < raw.value(a, j) {
                        assert!(normalized.value(a, i) < normalized.value(a, j));
                    }
                }
            }
        }
    }

    #[test]
    fn test_all_zero_agent_is_degenerate() {
        let raw =
            Valuations::new(ids(&["a", "b"]), ids(&["x"]), vec![vec![1.0], vec![0.0]]).unwrap();
        let err = Normalizer::default().normalize(&raw, &[1.0, 1.0]).unwrap_err();
        assert!(matches!(err, AllocError::DegenerateInput(_)));
    }

    #[test]
    fn test_zero_entitlement_is_degenerate() {
        let (raw, mut entitlements) = parliament();
        entitlements[0] = 0.0;
        let err = Normalizer::default().normalize(&raw, &entitlements).unwrap_err();
        assert!(matches!(err, AllocError::DegenerateInput(_)));
    }

    #[test]
    fn test_entitlement_length_mismatch() {
        let (raw, _) = parliament();
        assert!(Normalizer::default().normalize(&raw, &[1.0]).is_err());
    }

    #[test]
    fn test_rounding_to_zero_is_degenerate() {
        let raw = Valuations::new(
            ids(&["a"]),
            ids(&["x", "y", "z"]),
            vec![vec![1.0, 1.0, 1.0]],
        )
        .unwrap();
        let normalizer = Normalizer::new(NormalizerConfig::fixed_sum(2.0)).unwrap();
        assert!(normalizer.normalize(&raw, &[]).is_err());
    }

    #[test]
    fn test_round_decimals_no_negative_zero() {
        let r = round_decimals(-0.0001, 3);
        assert_eq!(r, 0.0);
        assert!(r.is_sign_positive());
        assert_eq!(round_decimals(0.0005, 3), 0.0);
        assert_eq!(round_decimals(0.0015, 3), 0.002);
        assert_eq!(round_decimals(0.2764, 3), 0.276);
    }
}
