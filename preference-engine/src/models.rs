//! Domain records: preference state, item vectors, and the rating
//! mutation schema carried through the recompute queue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EnqueueError;

/// Per-user preference state.
///
/// Invariant: `behavioral_weight_sum == 0 && rating_count == 0` if and
/// only if `behavioral_embedding` is `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceState {
    /// Fixed baseline captured at onboarding; immutable afterwards.
    /// `None` means registration never completed and behavioral updates
    /// are not enabled for this user.
    pub interest_embedding: Option<Vec<f32>>,

    /// Running weighted average of rated item vectors.
    pub behavioral_embedding: Option<Vec<f32>>,

    /// Accumulated confidence weight behind `behavioral_embedding`.
    pub behavioral_weight_sum: f32,

    /// Number of live ratings contributing to the behavioral signal.
    pub rating_count: u32,

    /// Derived blend of interest and behavioral signals, used for
    /// candidate retrieval.
    pub profile_embedding: Vec<f32>,
}

impl PreferenceState {
    /// State of a freshly onboarded user: interest baseline set, no
    /// behavioral signal yet, profile equal to the baseline.
    pub fn onboarded(interest_embedding: Vec<f32>) -> Self {
        Self {
            profile_embedding: interest_embedding.clone(),
            interest_embedding: Some(interest_embedding),
            behavioral_embedding: None,
            behavioral_weight_sum: 0.0,
            rating_count: 0,
        }
    }
}

/// Catalog item vector. `embedding` stays `None` until the external
/// enrichment collaborator generates one; this core never creates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemVector {
    pub item_id: i64,
    pub embedding: Option<Vec<f32>>,
    pub genre_tags: Vec<u32>,
}

/// The mutation operation, internally tagged so one explicit schema is
/// validated at the queue boundary instead of inferred per job.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum Operation {
    Insert { rating: u8 },
    Update { rating: u8, old_rating: u8 },
    Delete { old_rating: u8 },
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Insert { .. } => "insert",
            Operation::Update { .. } => "update",
            Operation::Delete { .. } => "delete",
        }
    }
}

/// A single committed change to a rating record.
///
/// Ordering across users is irrelevant; ordering for the same user is
/// preserved by the recompute queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingMutation {
    pub user_id: Uuid,
    pub item_id: i64,
    #[serde(flatten)]
    pub operation: Operation,
}

impl RatingMutation {
    /// Boundary validation: every rating value must lie in 1..=5.
    pub fn validate(&self) -> Result<(), EnqueueError> {
        let check = |label: &str, rating: u8| {
            if (1..=5).contains(&rating) {
                Ok(())
            } else {
                Err(EnqueueError::Invalid(format!(
                    "{} {} out of range 1..=5",
                    label, rating
                )))
            }
        };

        match self.operation {
            Operation::Insert { rating } => check("rating", rating),
            Operation::Update { rating, old_rating } => {
                check("rating", rating)?;
                check("old_rating", old_rating)
            }
            Operation::Delete { old_rating } => check("old_rating", old_rating),
        }
    }
}

/// Benign reasons for completing a job without touching state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No `ItemVector` row exists for the item yet.
    ItemVectorMissing,
    /// The row exists but the embedding has not been generated.
    ItemNotEnriched,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::ItemVectorMissing => "item_vector_missing",
            SkipReason::ItemNotEnriched => "item_not_enriched",
        }
    }
}

/// Queued representation of a rating mutation.
///
/// `credential` is an opaque capability forwarded so a store scoped per
/// user can act with the user's authorization; it is never logged.
/// `key` exists for observability only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecomputeJob {
    pub id: Uuid,
    pub key: String,
    pub mutation: RatingMutation,
    pub credential: String,
    pub attempts_made: u32,
    pub enqueued_at: DateTime<Utc>,
}

impl RecomputeJob {
    pub fn new(mutation: RatingMutation, credential: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            key: format!("{}:{}", mutation.user_id, mutation.item_id),
            mutation,
            credential,
            attempts_made: 0,
            enqueued_at: Utc::now(),
        }
    }
}
