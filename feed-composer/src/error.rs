//! Error types for feed composition.

use thiserror::Error;

/// A candidate source failed. Whether this is fatal depends on the
/// source: the composer fails the request for the personalized source
/// and degrades gracefully for the others.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("candidate source unavailable: {0}")]
    Unavailable(#[from] anyhow::Error),
}

/// Errors surfaced by [`crate::aggregate::FeedComposer::compose`].
#[derive(Error, Debug)]
pub enum ComposeError {
    /// The personalized retrieval oracle failed; the feed cannot be
    /// assembled without it.
    #[error("personalized candidate source unavailable: {0}")]
    PersonalizedUnavailable(#[source] SourceError),

    /// Composer configuration failed validation.
    #[error("invalid composer configuration: {0}")]
    InvalidConfig(String),
}
