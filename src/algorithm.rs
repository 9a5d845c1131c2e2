//! Algorithm selection by name.
//!
//! [`AlgorithmKind`] is a closed set of allocators resolved at call time.
//! Every kind implements the same contract,
//! [`AlgorithmKind::allocate`], and rejects instances of the wrong shape
//! with [`AllocError::InstanceMismatch`].

use crate::context::RunContext;
use crate::error::{AllocError, AllocResult};
use crate::instance::{DiscreteInstance, DivisibleInstance};
use crate::leximin::{LeximinResult, LeximinSolver};
use crate::matching::{DiscreteAllocation, IteratedMatchingRunner, MatchingConfig, MatchingResult};
use crate::sharing::{BoundedSharingAllocator, BoundedSharingResult, FractionalAllocation};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Input of any allocator.
#[derive(Debug, Clone)]
pub enum Instance {
    Divisible(DivisibleInstance),
    Discrete(DiscreteInstance),
}

impl Instance {
    /// Short name of the instance shape.
    pub fn shape(&self) -> &'static str {
        match self {
            Instance::Divisible(_) => "divisible",
            Instance::Discrete(_) => "discrete",
        }
    }

    pub fn agents(&self) -> &[String] {
        match self {
            Instance::Divisible(i) => i.agents(),
            Instance::Discrete(i) => i.agents(),
        }
    }
}

impl From<DivisibleInstance> for Instance {
    fn from(instance: DivisibleInstance) -> Self {
        Instance::Divisible(instance)
    }
}

impl From<DiscreteInstance> for Instance {
    fn from(instance: DiscreteInstance) -> Self {
        Instance::Discrete(instance)
    }
}

/// Output of any allocator.
#[derive(Debug, Clone)]
pub enum Allocation {
    /// Leximin thresholds and the bounded-sharing allocation that meets them.
    Divisible {
        leximin: LeximinResult,
        sharing: BoundedSharingResult,
    },

    /// Bundles and per-agent decision traces.
    Discrete(MatchingResult),
}

impl Allocation {
    pub fn as_fractional(&self) -> Option<&FractionalAllocation> {
        match self {
            Allocation::Divisible { sharing, .. } => Some(&sharing.allocation),
            Allocation::Discrete(_) => None,
        }
    }

    pub fn as_discrete(&self) -> Option<&DiscreteAllocation> {
        match self {
            Allocation::Divisible { .. } => None,
            Allocation::Discrete(result) => Some(&result.allocation),
        }
    }
}

/// The allocators available by name.
///
/// # Examples
///
/// ```
/// use u_fairalloc::algorithm::AlgorithmKind;
///
/// let kind: AlgorithmKind = "iterated_maximum_matching".parse().unwrap();
/// assert_eq!(kind.name(), "iterated_maximum_matching");
/// assert!("leximin_bounded_sharing".parse::<AlgorithmKind>().is_ok());
/// assert!("round_robin".parse::<AlgorithmKind>().is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub enum AlgorithmKind {
    /// Leximin profile over divisible allocations, realized with at most
    /// `n - 1` shared items.
    #[default]
    LeximinBoundedSharing,

    /// Rounds of maximum-weight matching over capacitated indivisible items.
    IteratedMaximumMatching(MatchingConfig),
}

impl AlgorithmKind {
    pub fn name(&self) -> &'static str {
        match self {
            AlgorithmKind::LeximinBoundedSharing => "leximin_bounded_sharing",
            AlgorithmKind::IteratedMaximumMatching(_) => "iterated_maximum_matching",
        }
    }

    /// Instance shape this kind accepts.
    pub fn expects(&self) -> &'static str {
        match self {
            AlgorithmKind::LeximinBoundedSharing => "divisible",
            AlgorithmKind::IteratedMaximumMatching(_) => "discrete",
        }
    }

    /// Runs the allocator on `instance`.
    pub fn allocate(&self, instance: &Instance, ctx: &RunContext) -> AllocResult<Allocation> {
        self.allocate_with_cancel(instance, ctx, None)
    }

    /// Runs the allocator with an optional cancellation flag.
    pub fn allocate_with_cancel(
        &self,
        instance: &Instance,
        ctx: &RunContext,
        cancel: Option<Arc<AtomicBool>>,
    ) -> AllocResult<Allocation> {
        info!(algorithm = self.name(), instance = instance.shape(), "allocation requested");
        match (self, instance) {
            (AlgorithmKind::LeximinBoundedSharing, Instance::Divisible(inst)) => {
                let (leximin, sharing) = leximin_bounded_sharing(inst, ctx, cancel)?;
                Ok(Allocation::Divisible { leximin, sharing })
            }
            (AlgorithmKind::IteratedMaximumMatching(config), Instance::Discrete(inst)) => {
                IteratedMatchingRunner::run_with_cancel(inst, config, ctx, cancel)
                    .map(Allocation::Discrete)
            }
            _ => Err(AllocError::InstanceMismatch {
                algorithm: self.name(),
                instance: instance.shape(),
            }),
        }
    }
}

impl FromStr for AlgorithmKind {
    type Err = AllocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "bounded_sharing" | "leximin_bounded_sharing" => {
                Ok(AlgorithmKind::LeximinBoundedSharing)
            }
            "iterated_maximum_matching" => {
                Ok(AlgorithmKind::IteratedMaximumMatching(MatchingConfig::default()))
            }
            other => Err(AllocError::InvalidConfig(format!("unknown algorithm {other:?}"))),
        }
    }
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Computes the leximin profile, then a bounded-sharing allocation that
/// dominates it.
///
/// The context's timeout covers both stages together.
pub fn leximin_bounded_sharing(
    instance: &DivisibleInstance,
    ctx: &RunContext,
    cancel: Option<Arc<AtomicBool>>,
) -> AllocResult<(LeximinResult, BoundedSharingResult)> {
    let started = Instant::now();
    let leximin = LeximinSolver::solve_with_cancel(instance, ctx, cancel.clone())?;

    let mut remaining = ctx.clone();
    if let Some(limit) = ctx.timeout {
        let elapsed = started.elapsed();
        if elapsed >= limit {
            return Err(AllocError::SolverTimeout {
                elapsed_ms: elapsed.as_millis() as u64,
                limit_ms: limit.as_millis() as u64,
            });
        }
        remaining.timeout = Some(limit - elapsed);
    }
    let sharing = BoundedSharingAllocator::allocate_with_cancel(
        instance,
        &leximin.profile,
        &remaining,
        cancel,
    )?;
    Ok((leximin, sharing))
}
