//! Iterated maximum-matching execution loop.

use super::config::{AdjustmentPolicy, MatchingConfig};
use super::explanation::{ClaimDecision, ExplanationRecorder, NoExplanation};
use super::flow::max_weight_claims;
use super::types::{DiscreteAllocation, TerminationReason};
use crate::context::{Budget, RunContext};
use crate::error::{AllocError, AllocResult};
use crate::instance::{DiscreteInstance, Valuations};
use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{debug, info};

/// Result of an iterated-matching run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchingResult {
    /// Final bundles.
    pub allocation: DiscreteAllocation,

    /// Per-agent decisions in round order. Every agent has an entry.
    pub traces: BTreeMap<String, Vec<ClaimDecision>>,

    /// Total normalized value of every bundle, in agent order.
    pub utilities: Vec<f64>,

    /// Number of rounds that assigned at least one item.
    pub rounds: usize,

    /// Total number of (agent, item) assignments.
    pub claims: usize,

    /// Why the loop stopped.
    pub termination: TerminationReason,
}

/// Mutable bookkeeping of one run.
struct RoundState<'a> {
    valuations: &'a Valuations,
    policy: AdjustmentPolicy,
    agent_left: Vec<u32>,
    item_left: Vec<u32>,
    weights: Vec<Vec<f64>>,
    accumulated: Vec<f64>,
    allocation: DiscreteAllocation,
}

impl<'a> RoundState<'a> {
    fn new(instance: &'a DiscreteInstance, policy: AdjustmentPolicy) -> Self {
        let valuations = instance.valuations();
        Self {
            valuations,
            policy,
            agent_left: instance.agent_capacities().to_vec(),
            item_left: instance.item_capacities().to_vec(),
            weights: (0..instance.num_agents())
                .map(|a| valuations.row(a).to_vec())
                .collect(),
            accumulated: vec![0.0; instance.num_agents()],
            allocation: DiscreteAllocation::empty(instance.agents(), instance.items()),
        }
    }

    /// Claim weight of `agent` for `item`, or `None` if the claim is not
    /// allowed this round.
    fn weight(&self, agent: usize, item: usize) -> Option<f64> {
        if self.item_left[item] == 0
            || self.allocation.holds(agent, item)
            || self.valuations.value(agent, item) <= 0.0
        {
            return None;
        }
        Some(self.policy.weight(self.weights[agent][item], self.accumulated[agent]))
    }

    /// Highest-weight claimable item other than `except` (lowest index on ties).
    fn best_item(&self, agent: usize, except: Option<usize>) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for o in 0..self.item_left.len() {
            if Some(o) == except {
                continue;
            }
            if let Some(w) = self.weight(agent, o) {
                if best.is_none_or(|(_, bw)| w > bw) {
                    best = Some((o, w));
                }
            }
        }
        best
    }

    fn assign(&mut self, agent: usize, item: usize) {
        self.allocation.give(agent, item);
        self.agent_left[agent] -= 1;
        self.item_left[item] -= 1;
        self.accumulated[agent] += self.valuations.value(agent, item);
    }
}

/// A claim planned against the state at the start of its round.
struct PlannedClaim {
    agent: usize,
    item: usize,
    decision: ClaimDecision,
    compensate: Option<(usize, f64)>,
}

/// Allocates indivisible, capacity-constrained items by repeated
/// maximum-weight matching.
///
/// Every round, each agent with capacity left may claim one unit of one
/// item it does not yet hold. The claims form a maximum-weight b-matching
/// in which item `o` supplies up to its remaining capacity. Weights start
/// at the normalized valuations and are bent between rounds by the
/// configured [`AdjustmentPolicy`].
///
/// The loop stops when every agent is full, every item is exhausted, or no
/// remaining agent wants any remaining item.
pub struct IteratedMatchingRunner;

impl IteratedMatchingRunner {
    /// Runs the matching rounds.
    pub fn run(
        instance: &DiscreteInstance,
        config: &MatchingConfig,
        ctx: &RunContext,
    ) -> AllocResult<MatchingResult> {
        Self::run_with_recorder(instance, config, ctx, &mut NoExplanation, None)
    }

    /// Runs with an optional cancellation flag.
    pub fn run_with_cancel(
        instance: &DiscreteInstance,
        config: &MatchingConfig,
        ctx: &RunContext,
        cancel: Option<Arc<AtomicBool>>,
    ) -> AllocResult<MatchingResult> {
        Self::run_with_recorder(instance, config, ctx, &mut NoExplanation, cancel)
    }

    /// Runs and reports every decision to `recorder`.
    pub fn run_with_recorder<R: ExplanationRecorder + ?Sized>(
        instance: &DiscreteInstance,
        config: &MatchingConfig,
        ctx: &RunContext,
        recorder: &mut R,
        cancel: Option<Arc<AtomicBool>>,
    ) -> AllocResult<MatchingResult> {
        ctx.checked()?;
        config.validate().map_err(AllocError::InvalidConfig)?;
        let budget = Budget::start(ctx, cancel);

        let agents = instance.agents();
        let items = instance.items();
        let order = ctx.agent_order(agents);
        let mut state = RoundState::new(instance, config.adjustment);
        let mut traces: Vec<Vec<ClaimDecision>> = vec![Vec::new(); agents.len()];
        let mut rounds = 0usize;
        let mut claims = 0usize;

        let termination = loop {
            budget.check()?;
            let active: Vec<usize> = order
                .iter()
                .copied()
                .filter(|&a| state.agent_left[a] > 0)
                .collect();
            if active.is_empty() {
                break TerminationReason::AgentsSaturated;
            }
            if state.item_left.iter().all(|&c| c == 0) {
                break TerminationReason::ItemsExhausted;
            }
            if config.max_rounds.is_some_and(|max| rounds >= max) {
                break TerminationReason::RoundLimit;
            }

            let matched = max_weight_claims(&active, &state.item_left, |a, o| state.weight(a, o));
            if matched.is_empty() {
                break TerminationReason::NoDesiredItem;
            }
            rounds += 1;

            let planned: Vec<PlannedClaim> = matched
                .iter()
                .map(|&(a, o)| plan_claim(&state, ctx, rounds, items, a, o))
                .collect();

            for claim in planned {
                let agent = agents[claim.agent].as_str();
                recorder.record_claim(agent, &claim.decision);
                if let Some((next, lost)) = claim.compensate {
                    state.weights[claim.agent][next] += lost;
                    recorder.record_compensation(agent, rounds, &items[next], lost);
                }
                state.assign(claim.agent, claim.item);
                traces[claim.agent].push(claim.decision);
            }
            claims += matched.len();

            debug!(
                round = rounds,
                matched = matched.len(),
                active_agents = active.len(),
                seats_left = state.item_left.iter().map(|&c| c as u64).sum::<u64>(),
                "matching round"
            );
        };

        let allocation = state.allocation;
        let utilities = allocation.utilities(instance.valuations());
        for (a, agent) in agents.iter().enumerate() {
            recorder.record_final(agent, &allocation.bundle_names(a), utilities[a]);
        }
        info!(
            rounds,
            claims,
            ?termination,
            elapsed_ms = budget.elapsed_ms(),
            "iterated matching finished"
        );

        Ok(MatchingResult {
            traces: agents.iter().cloned().zip(traces).collect(),
            allocation,
            utilities,
            rounds,
            claims,
            termination,
        })
    }
}

fn plan_claim(
    state: &RoundState<'_>,
    ctx: &RunContext,
    round: usize,
    items: &[String],
    agent: usize,
    item: usize,
) -> PlannedClaim {
    let weight = state.weight(agent, item).unwrap_or(0.0);
    let best_available = state
        .best_item(agent, None)
        .map_or(weight, |(_, w)| w.max(weight));
    let decision = ClaimDecision {
        round,
        item: items[item].clone(),
        value: state.valuations.value(agent, item),
        weight,
        best_available,
    };
    let lost = decision.lost();
    let compensate = if state.policy.compensates() && lost > ctx.tolerance_for(best_available) {
        state.best_item(agent, Some(item)).map(|(next, _)| (next, lost))
    } else {
        None
    };
    PlannedClaim {
        agent,
        item,
        decision,
        compensate,
    }
}
