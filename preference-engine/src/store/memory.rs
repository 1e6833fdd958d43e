//! In-memory store implementations backed by `DashMap`.
//!
//! Used by the test suite and suitable for embedding in processes that
//! do not need durable state.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::models::{ItemVector, PreferenceState};
use crate::store::{ItemVectorStore, PreferenceStore};

/// `DashMap`-backed [`PreferenceStore`].
#[derive(Default)]
pub struct MemoryPreferenceStore {
    states: DashMap<Uuid, PreferenceState>,
    writes: AtomicU64,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a state row, bypassing the write counter.
    pub fn seed(&self, user_id: Uuid, state: PreferenceState) {
        self.states.insert(user_id, state);
    }

    /// Number of `put_state` calls observed since construction.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl PreferenceStore for MemoryPreferenceStore {
    async fn get_state(&self, user_id: Uuid) -> StoreResult<PreferenceState> {
        self.states
            .get(&user_id)
            .map(|entry| entry.clone())
            .ok_or(StoreError::StateNotFound(user_id))
    }

    async fn put_state(&self, user_id: Uuid, state: &PreferenceState) -> StoreResult<()> {
        self.writes.fetch_add(1, Ordering::Relaxed);
        self.states.insert(user_id, state.clone());
        Ok(())
    }
}

/// `DashMap`-backed [`ItemVectorStore`].
#[derive(Default)]
pub struct MemoryItemVectorStore {
    items: DashMap<i64, ItemVector>,
}

impl MemoryItemVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, item: ItemVector) {
        self.items.insert(item.item_id, item);
    }
}

#[async_trait]
impl ItemVectorStore for MemoryItemVectorStore {
    async fn get_item_vector(&self, item_id: i64) -> StoreResult<Option<ItemVector>> {
        Ok(self.items.get(&item_id).map(|entry| entry.clone()))
    }
}
