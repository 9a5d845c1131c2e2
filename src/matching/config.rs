//! Iterated-matching configuration and weight adjustment policies.

/// How claim weights change between matching rounds.
///
/// Each round an agent's weight for an item starts from its normalized
/// valuation. The policy decides how the history of earlier rounds bends
/// that weight.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AdjustmentPolicy {
    /// Weights are the raw valuations in every round.
    None,

    /// An agent that receives less than its best available item in a round
    /// has the difference added to its weight for its best remaining item
    /// (other than the one it received).
    ///
    /// `lost = max_o w(a, o) - w(a, claimed)`, added to
    /// `w(a, next_best)` for later rounds.
    #[default]
    CompensateLoss,

    /// Weights are divided by one plus the value the agent has accumulated:
    /// `w(a, o) = v(a, o) / (1 + U_a)`.
    DivideByAccumulated,
}

impl AdjustmentPolicy {
    /// Weight presented to the matching for a single claim.
    pub fn weight(&self, current: f64, accumulated: f64) -> f64 {
        match self {
            AdjustmentPolicy::None | AdjustmentPolicy::CompensateLoss => current,
            AdjustmentPolicy::DivideByAccumulated => current / (1.0 + accumulated.max(0.0)),
        }
    }

    /// Whether unclaimed best items are compensated after each round.
    pub fn compensates(&self) -> bool {
        matches!(self, AdjustmentPolicy::CompensateLoss)
    }
}

/// Configuration for the iterated maximum-matching allocator.
///
/// # Examples
///
/// ```
/// use u_fairalloc::matching::{AdjustmentPolicy, MatchingConfig};
///
/// let config = MatchingConfig::default()
///     .with_adjustment(AdjustmentPolicy::DivideByAccumulated)
///     .with_max_rounds(10);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchingConfig {
    /// Weight adjustment between rounds.
    pub adjustment: AdjustmentPolicy,

    /// Hard cap on the number of rounds. `None` = run until terminal.
    pub max_rounds: Option<usize>,
}

impl MatchingConfig {
    pub fn with_adjustment(mut self, adjustment: AdjustmentPolicy) -> Self {
        self.adjustment = adjustment;
        self
    }

    pub fn with_max_rounds(mut self, rounds: usize) -> Self {
        self.max_rounds = Some(rounds);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_rounds == Some(0) {
            return Err("max_rounds must be positive".into());
        }
        Ok(())
    }
}
