//! Run-scoped configuration threaded through every stage.
//!
//! A [`RunContext`] carries only configuration. Nothing here is global or
//! survives between runs; each solver call builds its own [`Budget`] from
//! the context when it starts.

use crate::error::{AllocError, AllocResult};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Order in which agents are presented to the matching rounds.
///
/// Whatever the choice, the same input always produces the same output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TieBreak {
    /// Agents sorted by identifier.
    #[default]
    Lexicographic,

    /// Agents in the order they were given.
    InputOrder,

    /// Agents shuffled once with a seeded RNG.
    Seeded { seed: u64 },
}

/// Configuration for a single allocation run.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use u_fairalloc::{RunContext, TieBreak};
///
/// let ctx = RunContext::default()
///     .with_precision(3)
///     .with_timeout(Duration::from_secs(30))
///     .with_tie_break(TieBreak::InputOrder);
/// assert!(ctx.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunContext {
    /// Number of decimal places kept in output fractions.
    pub precision: u32,

    /// Absolute tolerance for comparing LP values, scaled by magnitude
    /// where values exceed 1.
    pub tolerance: f64,

    /// Wall-clock budget for a whole solver call. `None` = unlimited.
    pub timeout: Option<Duration>,

    /// Agent ordering used to make matching tie-breaks reproducible.
    pub tie_break: TieBreak,

    /// Solve independent leximin probe programs in parallel using rayon.
    ///
    /// Ignored unless the `parallel` feature is enabled.
    pub parallel: bool,
}

impl Default for RunContext {
    fn default() -> Self {
        Self {
            precision: 3,
            tolerance: 1e-6,
            timeout: None,
            tie_break: TieBreak::default(),
            parallel: false,
        }
    }
}

impl RunContext {
    pub fn with_precision(mut self, digits: u32) -> Self {
        self.precision = digits;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.precision > 12 {
            return Err(format!("precision must be at most 12, got {}", self.precision));
        }
        if !(self.tolerance > 0.0 && self.tolerance < 1e-2) {
            return Err(format!(
                "tolerance must be in (0, 0.01), got {}",
                self.tolerance
            ));
        }
        if self.timeout.is_some_and(|t| t.is_zero()) {
            return Err("timeout must be non-zero".into());
        }
        Ok(())
    }

    pub(crate) fn checked(&self) -> AllocResult<()> {
        self.validate().map_err(AllocError::InvalidConfig)
    }

    /// Tolerance scaled to the magnitude of `value`.
    pub(crate) fn tolerance_for(&self, value: f64) -> f64 {
        self.tolerance * value.abs().max(1.0)
    }

    /// Returns agent indices in tie-break order.
    pub fn agent_order(&self, agents: &[String]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..agents.len()).collect();
        match self.tie_break {
            TieBreak::Lexicographic => order.sort_by(|&a, &b| agents[a].cmp(&agents[b])),
            TieBreak::InputOrder => {}
            TieBreak::Seeded { seed } => {
                let mut rng = StdRng::seed_from_u64(seed);
                order.shuffle(&mut rng);
            }
        }
        order
    }
}

/// Time and cancellation budget of one solver call.
#[derive(Debug, Clone)]
pub(crate) struct Budget {
    started: Instant,
    limit: Option<Duration>,
    cancel: Option<Arc<AtomicBool>>,
}

impl Budget {
    pub(crate) fn start(ctx: &RunContext, cancel: Option<Arc<AtomicBool>>) -> Self {
        Self {
            started: Instant::now(),
            limit: ctx.timeout,
            cancel,
        }
    }

    pub(crate) fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    /// Fails if the cancel flag is raised or the time limit has passed.
    pub(crate) fn check(&self) -> AllocResult<()> {
        if let Some(ref flag) = self.cancel {
            if flag.load(Ordering::Relaxed) {
                return Err(AllocError::Cancelled);
            }
        }
        if let Some(limit) = self.limit {
            let elapsed = self.started.elapsed();
            if elapsed > limit {
                return Err(AllocError::SolverTimeout {
                    elapsed_ms: elapsed.as_millis() as u64,
                    limit_ms: limit.as_millis() as u64,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_default_context() {
        let ctx = RunContext::default();
        assert_eq!(ctx.precision, 3);
        assert!(ctx.timeout.is_none());
        assert_eq!(ctx.tie_break, TieBreak::Lexicographic);
        assert!(ctx.validate().is_ok());
    }

    #[test]
    fn test_validate_bad_tolerance() {
        assert!(RunContext::default().with_tolerance(0.0).validate().is_err());
        assert!(RunContext::default().with_tolerance(0.5).validate().is_err());
    }

    #[test]
    fn test_validate_zero_timeout() {
        let ctx = RunContext::default().with_timeout(Duration::ZERO);
        assert!(ctx.validate().is_err());
    }

    #[test]
    fn test_lexicographic_order() {
        let ctx = RunContext::default();
        let order = ctx.agent_order(&names(&["s3", "s1", "s2"]));
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn test_input_order() {
        let ctx = RunContext::default().with_tie_break(TieBreak::InputOrder);
        let order = ctx.agent_order(&names(&["s3", "s1", "s2"]));
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn test_seeded_order_is_reproducible() {
        let agents = names(&["a", "b", "c", "d", "e", "f"]);
        let ctx = RunContext::default().with_tie_break(TieBreak::Seeded { seed: 7 });
        let first = ctx.agent_order(&agents);
        let second = ctx.agent_order(&agents);
        assert_eq!(first, second);

        let mut sorted = first.clone();
        sorted.sort();
        assert_eq!(sorted, (0..agents.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_budget_cancelled() {
        let ctx = RunContext::default();
        let flag = Arc::new(AtomicBool::new(true));
        let budget = Budget::start(&ctx, Some(flag));
        assert_eq!(budget.check(), Err(AllocError::Cancelled));
    }

    #[test]
    fn test_budget_timeout() {
        let ctx = RunContext::default().with_timeout(Duration::from_nanos(1));
        let budget = Budget::start(&ctx, None);
        std::thread::sleep(Duration::from_millis(2));
        assert!(matches!(
            budget.check(),
            Err(AllocError::SolverTimeout { .. })
        ));
    }

    #[test]
    fn test_tolerance_scales() {
        let ctx = RunContext::default();
        assert!((ctx.tolerance_for(0.5) - 1e-6).abs() < 1e-15);
        assert!((ctx.tolerance_for(1000.0) - 1e-3).abs() < 1e-12);
    }
}
