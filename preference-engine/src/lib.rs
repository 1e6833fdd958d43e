//! # Incremental Preference Embedding Engine
//!
//! Maintains a per-user preference vector that evolves as the user
//! rates catalog items. A committed rating mutation (insert / update /
//! delete) is validated and enqueued as a [`models::RecomputeJob`]; a
//! single logical [`worker::RecomputeWorker`] later fetches the user's
//! [`models::PreferenceState`] and the item's vector, runs the pure
//! [`update::apply`] algorithm, and persists the result with one atomic
//! write.
//!
//! ## Guarantees
//!
//! - **Invertible accumulation**: the behavioral embedding is a
//!   weighted running average, so a delete exactly undoes the matching
//!   insert and an update is delete-then-insert in a single write.
//! - **Same-user ordering**: jobs flow through one FIFO channel into
//!   one consumer; two jobs for the same user never race on the shared
//!   weight accumulator.
//! - **At-least-once with bounded retry**: transient failures back off
//!   exponentially; exhausted or fatally failed jobs land in a bounded
//!   dead set for inspection, never silently discarded.
//! - **Eventual consistency**: enqueue returns as soon as the job is
//!   accepted; readers of the profile embedding may observe state from
//!   before the latest mutation until its job completes.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use preference_engine::{
//!     Operation, RatingMutation, RecomputeQueue, RecomputeWorker, WorkerConfig,
//!     MemoryItemVectorStore, MemoryPreferenceStore,
//! };
//! use std::sync::Arc;
//! use uuid::Uuid;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let states = Arc::new(MemoryPreferenceStore::new());
//!     let items = Arc::new(MemoryItemVectorStore::new());
//!
//!     let (queue, rx) = RecomputeQueue::bounded(1024);
//!     let worker = Arc::new(RecomputeWorker::new(
//!         states,
//!         items,
//!         WorkerConfig::from_env(),
//!     ));
//!
//!     let handle = {
//!         let worker = worker.clone();
//!         tokio::spawn(async move { worker.run(rx).await })
//!     };
//!
//!     queue
//!         .enqueue(
//!             RatingMutation {
//!                 user_id: Uuid::new_v4(),
//!                 item_id: 42,
//!                 operation: Operation::Insert { rating: 5 },
//!             },
//!             "user-scoped-token".to_string(),
//!         )
//!         .await?;
//!
//!     queue.close();
//!     handle.await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod math;
pub mod metrics;
pub mod models;
pub mod queue;
pub mod store;
pub mod update;
pub mod worker;

pub use config::WorkerConfig;
pub use error::{EnqueueError, StoreError, StoreResult, UpdateError, UpdateResult};
pub use metrics::EngineMetrics;
pub use models::{
    ItemVector, Operation, PreferenceState, RatingMutation, RecomputeJob, SkipReason,
};
pub use queue::RecomputeQueue;
pub use store::{
    ItemVectorStore, MemoryItemVectorStore, MemoryPreferenceStore, PreferenceStore,
};
pub use update::{apply, confidence, signal, UpdateOutcome};
pub use worker::{CompletedJob, DeadJob, ProcessResult, RecomputeWorker};
