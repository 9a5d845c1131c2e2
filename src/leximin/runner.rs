//! Leximin fix-and-peel loop.

use super::types::UtilityProfile;
use crate::context::{Budget, RunContext};
use crate::error::AllocResult;
use crate::instance::{DivisibleInstance, Valuations};
use crate::lp::{
    fraction_variables, read_fractions, solver_error, utilities, utility_expression,
    with_unit_items,
};
use good_lp::{microlp, variable, ProblemVariables, SolverModel};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

/// Margin, in units of the scaled tolerance, within which a probed agent
/// counts as unable to rise above the round's minimum.
const SATURATION_FACTOR: f64 = 1e3;

/// Result of a leximin solve.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LeximinResult {
    /// The leximin-optimal utility of every agent.
    pub profile: UtilityProfile,

    /// Number of fix-and-peel rounds.
    pub rounds: usize,

    /// Total number of linear programs solved.
    pub lp_solves: usize,
}

/// Computes leximin-optimal utility profiles.
///
/// Each round maximizes the smallest utility among the live (not yet fixed)
/// agents while holding fixed agents at their values. Live agents that sit
/// at that minimum in the optimal solution are then probed one by one: an
/// agent whose utility cannot be raised above the minimum without pushing
/// another live agent below it is fixed at the minimum. The live set
/// shrinks by at least one agent per round.
///
/// # References
///
/// Ogryczak & Śliwiński (2006), "On Direct Methods for Lexicographic
/// Min-Max Optimization"
pub struct LeximinSolver;

impl LeximinSolver {
    /// Solves for the leximin profile of `instance`.
    pub fn solve(instance: &DivisibleInstance, ctx: &RunContext) -> AllocResult<LeximinResult> {
        Self::solve_with_cancel(instance, ctx, None)
    }

    /// Solves with an optional cancellation flag.
    pub fn solve_with_cancel(
        instance: &DivisibleInstance,
        ctx: &RunContext,
        cancel: Option<Arc<AtomicBool>>,
    ) -> AllocResult<LeximinResult> {
        ctx.checked()?;
        let budget = Budget::start(ctx, cancel);
        let prefs = instance.preferences();
        let n = prefs.num_agents();

        let mut fixed: Vec<Option<f64>> = vec![None; n];
        let mut live: Vec<usize> = (0..n).collect();
        let mut rounds = 0usize;
        let mut lp_solves = 0usize;

        while !live.is_empty() {
            budget.check()?;
            rounds += 1;

            let (minimum, realized) = maximin(prefs, &live, &fixed)?;
            lp_solves += 1;
            let tol = ctx.tolerance_for(minimum);
            let margin = tol * SATURATION_FACTOR;

            let mut candidates: Vec<usize> = live
                .iter()
                .copied()
                .filter(|&a| realized[a] <= minimum + margin)
                .collect();
            if candidates.is_empty() {
                candidates = lowest(&live, &realized);
            }

            budget.check()?;
            let probes = probe_all(prefs, &candidates, &live, &fixed, minimum - tol, ctx)?;
            lp_solves += probes.len();

            let mut saturated: Vec<usize> = probes
                .iter()
                .filter(|&&(_, best)| best <= minimum + margin)
                .map(|&(a, _)| a)
                .collect();
            if saturated.is_empty() {
                let floor = probes
                    .iter()
                    .map(|&(_, best)| best)
                    .fold(f64::INFINITY, f64::min);
                warn!(
                    round = rounds,
                    minimum,
                    floor,
                    "no probed agent saturated; fixing the lowest probe"
                );
                saturated = probes
                    .iter()
                    .filter(|&&(_, best)| best <= floor + margin)
                    .map(|&(a, _)| a)
                    .collect();
            }

            for &a in &saturated {
                fixed[a] = Some(minimum);
            }
            live.retain(|&a| fixed[a].is_none());
            info!(
                round = rounds,
                minimum,
                fixed = saturated.len(),
                live = live.len(),
                "leximin round"
            );
        }

        let values: Vec<f64> = fixed.into_iter().map(|u| u.unwrap_or(0.0)).collect();
        let profile = UtilityProfile::new(instance.agents().to_vec(), values)?;
        info!(
            rounds,
            lp_solves,
            elapsed_ms = budget.elapsed_ms(),
            "leximin profile computed"
        );
        Ok(LeximinResult {
            profile,
            rounds,
            lp_solves,
        })
    }
}

/// Maximizes the minimum utility over `live`; returns the optimum and the
/// realized utility of every agent in the optimal solution.
fn maximin(
    prefs: &Valuations,
    live: &[usize],
    fixed: &[Option<f64>],
) -> AllocResult<(f64, Vec<f64>)> {
    let mut vars = ProblemVariables::new();
    let x = fraction_variables(&mut vars, prefs);
    let t = vars.add(variable().min(0.0));
    let exprs: Vec<_> = (0..prefs.num_agents())
        .map(|a| utility_expression(prefs, &x, a))
        .collect();

    let mut model = with_unit_items(vars.maximise(t).using(microlp), &x);
    for &a in live {
        model = model.with(exprs[a].clone().geq(t));
    }
    for (a, value) in fixed.iter().enumerate() {
        if let Some(v) = *value {
            model = model.with(exprs[a].clone().geq(v - tolerance_floor(v)));
        }
    }

    let solution = model.solve().map_err(|e| solver_error("maximin round", e))?;
    let fractions = read_fractions(&solution, &x);
    let realized = utilities(prefs, &fractions);
    let minimum = live
        .iter()
        .map(|&a| realized[a])
        .fold(f64::INFINITY, f64::min);
    Ok((minimum, realized))
}

/// Largest utility `agent` can reach while every live agent keeps at least
/// `floor` and every fixed agent keeps its value.
fn probe(
    prefs: &Valuations,
    agent: usize,
    live: &[usize],
    fixed: &[Option<f64>],
    floor: f64,
) -> AllocResult<f64> {
    let mut vars = ProblemVariables::new();
    let x = fraction_variables(&mut vars, prefs);
    let exprs: Vec<_> = (0..prefs.num_agents())
        .map(|a| utility_expression(prefs, &x, a))
        .collect();

    let mut model = with_unit_items(vars.maximise(exprs[agent].clone()).using(microlp), &x);
    for &a in live {
        model = model.with(exprs[a].clone().geq(floor.max(0.0)));
    }
    for (a, value) in fixed.iter().enumerate() {
        if let Some(v) = *value {
            model = model.with(exprs[a].clone().geq(v - tolerance_floor(v)));
        }
    }

    let solution = model.solve().map_err(|e| solver_error("leximin probe", e))?;
    let fractions = read_fractions(&solution, &x);
    Ok(prefs.utility(agent, &fractions[agent]))
}

#[cfg(feature = "parallel")]
fn probe_all(
    prefs: &Valuations,
    candidates: &[usize],
    live: &[usize],
    fixed: &[Option<f64>],
    floor: f64,
    ctx: &RunContext,
) -> AllocResult<Vec<(usize, f64)>> {
    let run = |&a: &usize| probe(prefs, a, live, fixed, floor).map(|best| (a, best));
    if ctx.parallel {
        candidates.par_iter().map(run).collect()
    } else {
        candidates.iter().map(run).collect()
    }
}

#[cfg(not(feature = "parallel"))]
fn probe_all(
    prefs: &Valuations,
    candidates: &[usize],
    live: &[usize],
    fixed: &[Option<f64>],
    floor: f64,
    _ctx: &RunContext,
) -> AllocResult<Vec<(usize, f64)>> {
    candidates
        .iter()
        .map(|&a| probe(prefs, a, live, fixed, floor).map(|best| (a, best)))
        .collect()
}

/// Fixed agents are held slightly below their value so that the programs
/// stay feasible under floating-point error.
fn tolerance_floor(value: f64) -> f64 {
    1e-7 * value.abs().max(1.0)
}

fn lowest(live: &[usize], realized: &[f64]) -> Vec<usize> {
    let min = live
        .iter()
        .map(|&a| realized[a])
        .fold(f64::INFINITY, f64::min);
    live.iter().copied().filter(|&a| realized[a] <= min).collect()
}

impl From<LeximinResult> for UtilityProfile {
    fn from(result: LeximinResult) -> Self {
        result.profile
    }
}
