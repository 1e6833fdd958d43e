//! The candidate aggregator: fan-out to the three sources, priority
//! merge, and MMR hand-off.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::ComposerConfig;
use crate::error::{ComposeError, SourceError};
use crate::metrics::ComposerMetrics;
use crate::mmr;
use crate::models::{Candidate, CompositionStats, SourceKind};
use crate::sources::{CatalogProvider, RetrievalOracle};

/// Assembles a personalized, diversity-controlled feed from the three
/// candidate sources.
///
/// Reads the user's (possibly stale) profile indirectly through the
/// retrieval oracle; the staleness window until the user's latest
/// recompute job completes is an accepted tradeoff.
pub struct FeedComposer<O, C> {
    oracle: Arc<O>,
    catalog: Arc<C>,
    config: ComposerConfig,
    metrics: Option<ComposerMetrics>,
}

impl<O: RetrievalOracle, C: CatalogProvider> FeedComposer<O, C> {
    pub fn new(oracle: Arc<O>, catalog: Arc<C>, config: ComposerConfig) -> Self {
        Self {
            oracle,
            catalog,
            config,
            metrics: None,
        }
    }

    /// Create a composer that also updates Prometheus counters.
    pub fn new_with_metrics(
        oracle: Arc<O>,
        catalog: Arc<C>,
        config: ComposerConfig,
        metrics: ComposerMetrics,
    ) -> Self {
        Self {
            metrics: Some(metrics),
            ..Self::new(oracle, catalog, config)
        }
    }

    /// Compose the feed for a user: at most `final_count` candidates,
    /// merged by source priority and reranked for genre diversity.
    ///
    /// The three fetches run concurrently. A personalized-source
    /// failure fails the request; trending and new-release failures
    /// degrade to empty lists so one flaky provider never empties the
    /// whole feed.
    pub async fn compose(&self, user_id: Uuid) -> Result<Vec<Candidate>, ComposeError> {
        let (personalized, trending, new_releases) = tokio::join!(
            self.oracle
                .personalized(user_id, self.config.personalized_limit, 0),
            self.catalog.trending(),
            self.catalog.new_releases(),
        );

        let personalized = personalized.map_err(ComposeError::PersonalizedUnavailable)?;
        let trending = self.degrade(user_id, SourceKind::Trending, trending);
        let new_releases = self.degrade(user_id, SourceKind::NewRelease, new_releases);

        let mut stats = CompositionStats {
            personalized_count: personalized.len(),
            trending_count: trending.len(),
            new_release_count: new_releases.len(),
            ..Default::default()
        };

        let merged = self.merge(personalized, trending, new_releases);
        stats.merged_count = merged.len();

        let feed = mmr::rerank(merged, self.config.final_count, self.config.mmr_lambda);
        stats.final_count = feed.len();

        info!(
            user_id = %user_id,
            personalized = stats.personalized_count,
            trending = stats.trending_count,
            new_release = stats.new_release_count,
            merged = stats.merged_count,
            final_count = stats.final_count,
            "feed composed"
        );
        if let Some(metrics) = &self.metrics {
            metrics.compositions.inc();
        }

        Ok(feed)
    }

    /// Replace a failed non-personalized fetch with an empty list,
    /// recording the degradation.
    fn degrade(
        &self,
        user_id: Uuid,
        source: SourceKind,
        result: Result<Vec<Candidate>, SourceError>,
    ) -> Vec<Candidate> {
        match result {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(
                    user_id = %user_id,
                    source = source.as_str(),
                    error = %e,
                    "candidate source failed, composing without it"
                );
                if let Some(metrics) = &self.metrics {
                    metrics
                        .degraded_sources
                        .with_label_values(&[source.as_str()])
                        .inc();
                }
                Vec::new()
            }
        }
    }

    /// Concatenate in priority order personalized → trending →
    /// new-release, dropping excluded genres and keeping the first
    /// occurrence of each item id.
    fn merge(
        &self,
        personalized: Vec<Candidate>,
        trending: Vec<Candidate>,
        new_releases: Vec<Candidate>,
    ) -> Vec<Candidate> {
        let mut seen: HashSet<i64> = HashSet::new();
        let mut merged = Vec::new();

        for candidate in personalized
            .into_iter()
            .chain(trending)
            .chain(new_releases)
        {
            if candidate
                .genre_tags
                .iter()
                .any(|tag| self.config.excluded_genre_tags.contains(tag))
            {
                continue;
            }
            if !seen.insert(candidate.item_id) {
                continue;
            }
            merged.push(candidate);
        }

        merged
    }
}
