//! Leximin-optimal utility profiles over divisible allocations.
//!
//! The leximin order compares utility vectors sorted ascending at their
//! first point of difference. The solver returns the profile that is
//! maximal in this order over the polytope of divisible allocations
//! (non-negative fractions, each item's fractions summing to 1).
//!
//! Only the profile is returned; the allocation supporting it is not unique,
//! and [`crate::sharing`] picks one with few shared items.
//!
//! # References
//!
//! - Ogryczak & Śliwiński (2006), "On Direct Methods for Lexicographic
//!   Min-Max Optimization"
//! - Sandomirskiy & Segal-Halevi (2022), "Efficient Fair Division with
//!   Minimal Sharing"

mod runner;
mod types;

pub use runner::{LeximinResult, LeximinSolver};
pub use types::{leximin_cmp, UtilityProfile};
