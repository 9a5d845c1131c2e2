//! Divisible allocations with a bounded number of shared items.
//!
//! Given utility thresholds (typically the leximin profile from
//! [`crate::leximin`]), [`BoundedSharingAllocator`] finds fractions of every
//! item for every agent such that each agent's utility reaches its
//! threshold and at most `n - 1` items are split among `n` agents.
//!
//! Output fractions are rounded to the configured precision; the rounding
//! residual of each item goes to its largest holder so every item stays
//! fully allocated.
//!
//! # References
//!
//! Sandomirskiy & Segal-Halevi (2022), "Efficient Fair Division with
//! Minimal Sharing", Operations Research 70(3)

mod rounding;
mod runner;
mod types;

pub use runner::{BoundedSharingAllocator, BoundedSharingResult};
pub use types::FractionalAllocation;
