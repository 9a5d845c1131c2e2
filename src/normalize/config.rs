//! Normalization targets and rounding modes.

/// Per-agent sum the normalized values are rescaled to.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NormalizationTarget {
    /// Every agent's values sum to the same constant.
    FixedSum(f64),

    /// Every agent's values sum to the total entitlement.
    TotalEntitlement,

    /// Agent `a`'s values sum to `total_entitlement / (entitlement(a) + epsilon)`.
    ///
    /// Agents with larger entitlement end up with smaller per-item values,
    /// so the solvers must hand them proportionally more items to reach the
    /// same normalized utility.
    EntitlementAdjusted,
}

impl NormalizationTarget {
    /// Whether this target reads entitlements.
    pub fn uses_entitlements(&self) -> bool {
        !matches!(self, NormalizationTarget::FixedSum(_))
    }
}

/// How normalized values are rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rounding {
    /// Keep full precision.
    Exact,

    /// Round half-to-even to a number of decimal places.
    Decimals(u32),

    /// Truncate toward zero to an integer.
    Truncate,
}

/// Configuration for the preference normalizer.
///
/// # Examples
///
/// ```
/// use u_fairalloc::normalize::{NormalizerConfig, NormalizationTarget, Rounding};
///
/// let config = NormalizerConfig::fixed_sum(1000.0);
/// assert_eq!(config.rounding, Rounding::Truncate);
///
/// let config = NormalizerConfig::default()
///     .with_target(NormalizationTarget::TotalEntitlement)
///     .with_rounding(Rounding::Decimals(2));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NormalizerConfig {
    /// Per-agent target sum.
    pub target: NormalizationTarget,

    /// Rounding applied to every normalized value.
    pub rounding: Rounding,

    /// Added to each entitlement in the denominator of
    /// [`NormalizationTarget::EntitlementAdjusted`].
    pub epsilon: f64,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self::entitlement_adjusted()
    }
}

impl NormalizerConfig {
    /// Entitlement-adjusted sums rounded to 3 decimals.
    pub fn entitlement_adjusted() -> Self {
        Self {
            target: NormalizationTarget::EntitlementAdjusted,
            rounding: Rounding::Decimals(3),
            epsilon: 0.001,
        }
    }

    /// A fixed per-agent sum with integer truncation.
    pub fn fixed_sum(sum: f64) -> Self {
        Self {
            target: NormalizationTarget::FixedSum(sum),
            rounding: Rounding::Truncate,
            epsilon: 0.001,
        }
    }

    pub fn with_target(mut self, target: NormalizationTarget) -> Self {
        self.target = target;
        self
    }

    pub fn with_rounding(mut self, rounding: Rounding) -> Self {
        self.rounding = rounding;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if let NormalizationTarget::FixedSum(sum) = self.target {
            if !(sum.is_finite() && sum > 0.0) {
                return Err(format!("fixed sum must be positive, got {sum}"));
            }
        }
        if let Rounding::Decimals(d) = self.rounding {
            if d > 12 {
                return Err(format!("at most 12 decimals, got {d}"));
            }
        }
        if !(self.epsilon.is_finite() && self.epsilon >= 0.0) {
            return Err(format!("epsilon must be non-negative, got {}", self.epsilon));
        }
        Ok(())
    }
}
