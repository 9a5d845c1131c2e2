//! Preference normalization.
//!
//! Turns raw, agent-specific valuations into values the solvers can compare
//! across agents. Formally, for agent `a` and item `o`:
//!
//! ```text
//! normalized[a][o] = raw[a][o] * (target_sum(a) / sum_o raw[a][o])
//! ```
//!
//! where `target_sum(a)` is a fixed constant, the total entitlement, or
//! `total_entitlement / (entitlement(a) + epsilon)`.
//!
//! The result is rounded (3 decimals by default) to keep LP coefficients
//! well-conditioned. An agent whose values sum to zero is rejected.

mod config;
mod normalizer;

pub use config::{NormalizationTarget, NormalizerConfig, Rounding};
pub use normalizer::{round_decimals, Normalizer};
