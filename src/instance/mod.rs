//! Allocation instances.
//!
//! An instance is built once from external input and is read-only
//! afterwards. The divisible path works on entitlement-normalized
//! preferences; the discrete path on normalized valuations plus agent and
//! item capacities.
//!
//! - [`Valuations`]: dense agent-by-item value matrix with ordered ids
//! - [`DivisibleInstance`]: one unit of each item, shared among agents
//! - [`DiscreteInstance`]: indivisible items with seat capacities

mod discrete;
mod divisible;
mod valuations;

pub use discrete::DiscreteInstance;
pub use divisible::DivisibleInstance;
pub use valuations::Valuations;
