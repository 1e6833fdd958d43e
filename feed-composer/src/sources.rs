//! Collaborator seams for the three candidate sources.
//!
//! All three are external and may fail independently; the composer
//! decides which failures are fatal.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::SourceError;
use crate::models::Candidate;

/// The external ranking oracle behind the personalized candidate list.
///
/// Retrieval semantics (vector similarity against the user's profile
/// embedding) are the oracle's concern; this core invokes it as a
/// black box.
#[async_trait]
pub trait RetrievalOracle: Send + Sync {
    /// Fetch up to `limit` ranked candidates for a user, each carrying
    /// a relevance score.
    async fn personalized(
        &self,
        user_id: Uuid,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Candidate>, SourceError>;
}

/// The external catalog provider behind the non-personalized lists.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    async fn trending(&self) -> Result<Vec<Candidate>, SourceError>;

    async fn new_releases(&self) -> Result<Vec<Candidate>, SourceError>;
}
