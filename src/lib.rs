//! Fair allocation of resources among agents with entitlement-weighted
//! valuations.
//!
//! Two allocation regimes are provided:
//!
//! - **Divisible**: every item is one unit that can be split. The
//!   [`leximin`] solver computes the leximin-optimal utility profile, and
//!   the [`sharing`] allocator realizes it with at most `n - 1` items split
//!   among `n` agents.
//! - **Discrete**: items are indivisible and have seat capacities; agents
//!   have bundle-size capacities. The [`matching`] allocator runs rounds of
//!   maximum-weight matching with fairness-adjusted weights.
//!
//! Both paths start from [`normalize`], which rescales raw valuations per
//! agent (optionally by entitlement), and both are reachable by name
//! through [`algorithm::AlgorithmKind`].
//!
//! # Architecture
//!
//! Every run is a single synchronous call over an immutable
//! [`instance`]. A [`RunContext`] carries the run-scoped settings
//! (precision, tolerance, timeout, tie-break); there is no global state.
//! Failures are typed [`AllocError`] values and never partial results.
//! The [`sheet`] module converts between spreadsheet cell grids and these
//! types without doing any I/O.
//!
//! # Features
//!
//! - `serde`: `Serialize`/`Deserialize` on configurations and results
//! - `parallel`: leximin probe LPs solved on rayon

pub mod algorithm;
pub mod context;
pub mod error;
pub mod instance;
pub mod language;
pub mod leximin;
mod lp;
pub mod matching;
pub mod normalize;
pub mod sharing;
pub mod sheet;

pub use context::{RunContext, TieBreak};
pub use error::{AllocError, AllocResult};
pub use language::Language;
