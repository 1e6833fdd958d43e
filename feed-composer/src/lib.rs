//! # Diversity-Aware Feed Composer
//!
//! Assembles a personalized, diversity-controlled feed from three
//! heterogeneous candidate sources: a personalized list from an
//! external retrieval oracle, plus trending and newly-available lists
//! from a catalog provider. The sources are fetched concurrently,
//! merged with first-wins deduplication in priority order, filtered
//! against excluded genres, and trimmed with MMR (Maximal Marginal
//! Relevance) reranking so high genre overlap does not crowd out
//! variety.
//!
//! Failure handling is asymmetric on purpose: the feed cannot exist
//! without the personalized source, so its failure fails the request,
//! while trending / new-release failures degrade to fewer sources
//! rather than an empty feed.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use feed_composer::{ComposerConfig, FeedComposer};
//! use std::sync::Arc;
//!
//! let composer = FeedComposer::new(oracle, catalog, ComposerConfig::from_env());
//! let feed = composer.compose(user_id).await?;
//! ```

pub mod aggregate;
pub mod config;
pub mod error;
pub mod metrics;
pub mod mmr;
pub mod models;
pub mod sources;

pub use aggregate::FeedComposer;
pub use config::ComposerConfig;
pub use error::{ComposeError, SourceError};
pub use metrics::ComposerMetrics;
pub use mmr::{jaccard, rerank};
pub use models::{Candidate, CompositionStats, SourceKind};
pub use sources::{CatalogProvider, RetrievalOracle};
