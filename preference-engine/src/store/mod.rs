//! Persistence seams for preference state and item vectors.
//!
//! These traits abstract the storage layer so the worker can be driven
//! against in-memory fakes in tests and against a real backend in
//! production. Per-row atomic writes are assumed from `put_state`;
//! no multi-row transaction is required by this core.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreResult;
use crate::models::{ItemVector, PreferenceState};

pub mod memory;

pub use memory::{MemoryItemVectorStore, MemoryPreferenceStore};

/// Read/write access to the per-user preference state row.
///
/// The recompute worker is the only writer; feed composition reads the
/// row without locking and may observe a slightly stale profile until
/// the corresponding job completes.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Fetch the preference state for a user.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::StateNotFound` if no row exists, or
    /// `StoreError::Unavailable` on backend failure.
    async fn get_state(&self, user_id: Uuid) -> StoreResult<PreferenceState>;

    /// Persist a new preference state with a single atomic write keyed
    /// by user.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` on backend failure.
    async fn put_state(&self, user_id: Uuid, state: &PreferenceState) -> StoreResult<()>;
}

/// Read-only access to catalog item vectors.
///
/// An absent row is `Ok(None)`, not an error: enrichment is an external
/// collaborator invoked out-of-band, and jobs skip until the vector
/// appears.
#[async_trait]
pub trait ItemVectorStore: Send + Sync {
    async fn get_item_vector(&self, item_id: i64) -> StoreResult<Option<ItemVector>>;
}
