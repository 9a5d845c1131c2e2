//! Bounded-sharing allocation.

use super::rounding::round_fractions;
use super::types::FractionalAllocation;
use crate::context::{Budget, RunContext};
use crate::error::{AllocError, AllocResult};
use crate::instance::DivisibleInstance;
use crate::leximin::UtilityProfile;
use crate::lp::{
    fraction_variables, read_fractions, solver_error, utility_expression, with_unit_items,
};
use good_lp::{microlp, Expression, ProblemVariables, ResolutionError, SolverModel};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of a bounded-sharing allocation.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundedSharingResult {
    /// The rounded allocation.
    pub allocation: FractionalAllocation,

    /// Realized utility of every agent under the rounded allocation.
    pub utilities: Vec<f64>,

    /// Number of items split between two or more agents.
    pub shared_items: usize,

    /// Number of items whose rounded column had to be repaired to sum to 1.
    pub repaired_items: usize,
}

/// Finds a divisible allocation that dominates given utility thresholds
/// while splitting few items.
///
/// The allocation is a vertex of the polytope
///
/// ```text
/// { x >= 0 : sum_a x[a][o] = 1 for every item o,
///            sum_o v[a][o] x[a][o] >= threshold[a] for every agent a }
/// ```
///
/// reached by maximizing total utility with the simplex method. The optimum
/// is fractionally Pareto-optimal, and a fractionally Pareto-optimal vertex
/// has an acyclic consumption graph (agents linked to the items they hold a
/// positive share of). A forest over `n` agents in which every item is a
/// node has at most `n - 1` items of degree two or more, so at most `n - 1`
/// items are shared among the `n` agents.
///
/// # References
///
/// Sandomirskiy & Segal-Halevi (2022), "Efficient Fair Division with
/// Minimal Sharing", Operations Research 70(3)
pub struct BoundedSharingAllocator;

impl BoundedSharingAllocator {
    /// Allocates so that every agent reaches its threshold.
    pub fn allocate(
        instance: &DivisibleInstance,
        thresholds: &UtilityProfile,
        ctx: &RunContext,
    ) -> AllocResult<BoundedSharingResult> {
        Self::allocate_with_cancel(instance, thresholds, ctx, None)
    }

    /// Allocates with an optional cancellation flag.
    pub fn allocate_with_cancel(
        instance: &DivisibleInstance,
        thresholds: &UtilityProfile,
        ctx: &RunContext,
        cancel: Option<Arc<AtomicBool>>,
    ) -> AllocResult<BoundedSharingResult> {
        ctx.checked()?;
        if thresholds.agents() != instance.agents() {
            return Err(AllocError::DegenerateInput(
                "thresholds do not list the instance agents in order".into(),
            ));
        }
        let budget = Budget::start(ctx, cancel);
        budget.check()?;

        let prefs = instance.preferences();
        let mut vars = ProblemVariables::new();
        let x = fraction_variables(&mut vars, prefs);
        let exprs: Vec<Expression> = (0..prefs.num_agents())
            .map(|a| utility_expression(prefs, &x, a))
            .collect();
        let mut welfare = Expression::with_capacity(prefs.num_agents() * prefs.num_items());
        for e in &exprs {
            welfare += e.clone();
        }

        let mut model = with_unit_items(vars.maximise(welfare).using(microlp), &x);
        for (e, &theta) in exprs.iter().zip(thresholds.utilities()) {
            model = model.with(e.clone().geq(theta - ctx.tolerance_for(theta)));
        }

        let solution = model.solve().map_err(|e| match e {
            ResolutionError::Infeasible => AllocError::ThresholdInfeasible(format!(
                "no allocation reaches thresholds {:?}",
                thresholds.utilities()
            )),
            other => solver_error("bounded sharing", other),
        })?;
        budget.check()?;

        let mut fractions = read_fractions(&solution, &x);
        let n = prefs.num_agents();
        let raw_shared = (0..prefs.num_items())
            .filter(|&o| fractions.iter().filter(|row| row[o] > 1e-9).count() > 1)
            .count();
        debug!(raw_shared, "vertex solution found");

        let repaired_items = round_fractions(&mut fractions, ctx.precision);
        let allocation = FractionalAllocation::new(
            instance.agents().to_vec(),
            instance.items().to_vec(),
            fractions,
        );
        let utilities = allocation.utilities(prefs);
        let shared_items = allocation.num_shared();

        if shared_items + 1 > n {
            warn!(shared_items, agents = n, "more items shared than the vertex bound");
        }
        if repaired_items > 0 {
            debug!(repaired_items, "rounding residuals redistributed");
        }
        info!(
            shared_items,
            agents = n,
            items = prefs.num_items(),
            elapsed_ms = budget.elapsed_ms(),
            "bounded-sharing allocation"
        );

        Ok(BoundedSharingResult {
            allocation,
            utilities,
            shared_items,
            repaired_items,
        })
    }
}
