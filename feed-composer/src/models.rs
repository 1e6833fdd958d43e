//! Candidate records and composition statistics.

use serde::{Deserialize, Serialize};

/// Which source produced a candidate. Used for stats and logging;
/// merge priority is positional, not derived from this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    Personalized,
    Trending,
    NewRelease,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Personalized => "personalized",
            SourceKind::Trending => "trending",
            SourceKind::NewRelease => "new_release",
        }
    }
}

/// A feed candidate from one of the three sources.
///
/// `relevance_score` is present only for personalized-source items;
/// trending and new-release candidates carry none and rank on
/// diversity alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub item_id: i64,
    pub genre_tags: Vec<u32>,
    pub relevance_score: Option<f32>,
    pub source: SourceKind,
}

impl Candidate {
    pub fn personalized(item_id: i64, genre_tags: Vec<u32>, relevance_score: f32) -> Self {
        Self {
            item_id,
            genre_tags,
            relevance_score: Some(relevance_score),
            source: SourceKind::Personalized,
        }
    }

    pub fn trending(item_id: i64, genre_tags: Vec<u32>) -> Self {
        Self {
            item_id,
            genre_tags,
            relevance_score: None,
            source: SourceKind::Trending,
        }
    }

    pub fn new_release(item_id: i64, genre_tags: Vec<u32>) -> Self {
        Self {
            item_id,
            genre_tags,
            relevance_score: None,
            source: SourceKind::NewRelease,
        }
    }
}

/// Per-composition counters, logged once per request.
#[derive(Debug, Clone, Default)]
pub struct CompositionStats {
    pub personalized_count: usize,
    pub trending_count: usize,
    pub new_release_count: usize,
    /// Size after merge, dedupe, and genre exclusion.
    pub merged_count: usize,
    /// Size after MMR reranking.
    pub final_count: usize,
}
