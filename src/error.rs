//! Error types shared by every allocation stage.

/// Errors produced by normalization, the solvers and the allocators.
///
/// Every failure is surfaced as a typed value; no stage returns a partial
/// allocation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AllocError {
    /// Zero or negative entitlement/capacity, non-finite or negative values,
    /// mismatched dimensions, or an agent with no positive valuation.
    #[error("degenerate input: {0}")]
    DegenerateInput(String),

    /// Numerical failure inside a linear solve.
    #[error("solver failed: {0}")]
    Solver(String),

    /// A run exceeded its time budget.
    #[error("solver timed out after {elapsed_ms}ms (limit {limit_ms}ms)")]
    SolverTimeout { elapsed_ms: u64, limit_ms: u64 },

    /// No divisible allocation dominates the requested utility thresholds.
    #[error("no allocation dominates the utility thresholds: {0}")]
    ThresholdInfeasible(String),

    /// A zero capacity on an agent or item that some positive valuation
    /// depends on.
    #[error("capacity exceeded: {0}")]
    CapacityExceeded(String),

    /// The caller raised the cancellation flag.
    #[error("run cancelled")]
    Cancelled,

    /// A configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Tabular rows do not have the expected layout.
    #[error("malformed rows at row {row}, column {col}: {reason}")]
    MalformedRows {
        row: usize,
        col: usize,
        reason: String,
    },

    /// An algorithm was asked to run on an instance of the wrong kind.
    #[error("algorithm {algorithm} cannot run on a {instance} instance")]
    InstanceMismatch {
        algorithm: &'static str,
        instance: &'static str,
    },
}

impl AllocError {
    pub(crate) fn malformed(row: usize, col: usize, reason: impl Into<String>) -> Self {
        AllocError::MalformedRows {
            row,
            col,
            reason: reason.into(),
        }
    }
}

/// Result type for allocation operations.
pub type AllocResult<T> = std::result::Result<T, AllocError>;
