//! Discrete allocation of capacitated items by iterated maximum matching.
//!
//! Items (course seats) are indivisible and each has a number of copies;
//! each agent (student) may receive at most one copy of an item and at most
//! its capacity in total. The allocator runs rounds of maximum-weight
//! bipartite matching, one claim per agent per round, until nobody can or
//! wants to claim anything more.
//!
//! # Weight adjustment
//!
//! | Policy | Round weight |
//! |--------|--------------|
//! | [`AdjustmentPolicy::None`] | `v(a, o)` |
//! | [`AdjustmentPolicy::CompensateLoss`] | `v(a, o)` plus losses moved onto the next-best item |
//! | [`AdjustmentPolicy::DivideByAccumulated`] | `v(a, o) / (1 + U_a)` |
//!
//! # Explanations
//!
//! Every claim is kept in [`MatchingResult::traces`] and also reported to an
//! [`ExplanationRecorder`] passed to
//! [`IteratedMatchingRunner::run_with_recorder`].
//!
//! # References
//!
//! - Brustle, Dippel, Narayan, Suzuki & Vetta (2020), "One Dollar Each
//!   Eliminates Envy"
//! - Ahuja, Magnanti & Orlin (1993), "Network Flows", successive shortest
//!   paths

mod config;
mod explanation;
mod flow;
mod runner;
mod types;

pub use config::{AdjustmentPolicy, MatchingConfig};
pub use explanation::{
    ClaimDecision, ExplanationRecorder, NoExplanation, TextExplanationRecorder, TraceRecorder,
};
pub use runner::{IteratedMatchingRunner, MatchingResult};
pub use types::{DiscreteAllocation, TerminationReason};
