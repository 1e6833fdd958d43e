//! Error types for the preference engine.

use thiserror::Error;
use uuid::Uuid;

/// Result type alias for the pure update algorithm.
pub type UpdateResult<T> = Result<T, UpdateError>;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by the pure preference update algorithm.
///
/// These never wrap I/O failures: the algorithm operates on explicit
/// state passed in by the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UpdateError {
    /// The user's preference state has no interest baseline, meaning
    /// onboarding never completed. Behavioral updates are gated on it.
    #[error("preference state has no interest embedding (onboarding incomplete)")]
    IncompleteState,

    /// Two participating vectors disagree on dimensionality. This is a
    /// programming invariant violation, not a recoverable condition.
    #[error("vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Errors surfaced by preference / item vector stores.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No preference state row exists for the user.
    #[error("preference state not found for user {0}")]
    StateNotFound(Uuid),

    /// Backend failure (connection refused, timeout, ...). Retryable.
    #[error("store unavailable: {0}")]
    Unavailable(#[from] anyhow::Error),
}

/// Errors returned when enqueueing a recompute job.
#[derive(Error, Debug)]
pub enum EnqueueError {
    /// The mutation failed boundary validation.
    #[error("invalid rating mutation: {0}")]
    Invalid(String),

    /// The queue has been closed; no further jobs are accepted.
    #[error("recompute queue is closed")]
    Closed,
}
