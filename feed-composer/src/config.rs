//! Composer configuration.

use tracing::warn;

use crate::error::ComposeError;

/// Feed composition tuning.
#[derive(Debug, Clone)]
pub struct ComposerConfig {
    /// MMR relevance/diversity tradeoff. 1.0 is relevance only,
    /// 0.0 is diversity only.
    pub mmr_lambda: f32,
    /// Maximum feed length after reranking.
    pub final_count: usize,
    /// Cap on the personalized fetch.
    pub personalized_limit: usize,
    /// Candidates whose genre tags intersect this set are dropped.
    pub excluded_genre_tags: Vec<u32>,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            mmr_lambda: 0.8,
            final_count: 75,
            personalized_limit: 300,
            excluded_genre_tags: vec![99],
        }
    }
}

impl ComposerConfig {
    /// Create config from environment variables, falling back to
    /// defaults on missing or unparseable values. A combination that
    /// fails [`ComposerConfig::validate`] also falls back wholesale.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let config = Self {
            mmr_lambda: std::env::var("MMR_LAMBDA")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.mmr_lambda),
            final_count: std::env::var("MMR_FINAL_COUNT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.final_count),
            personalized_limit: std::env::var("PERSONALIZED_FETCH_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.personalized_limit),
            excluded_genre_tags: std::env::var("EXCLUDED_GENRE_TAGS")
                .ok()
                .map(|v| {
                    v.split(',')
                        .filter_map(|tag| tag.trim().parse().ok())
                        .collect()
                })
                .unwrap_or(defaults.excluded_genre_tags),
        };

        match config.validate() {
            Ok(()) => config,
            Err(e) => {
                warn!(
                    "invalid composer configuration from environment, using defaults: {}",
                    e
                );
                Self::default()
            }
        }
    }

    /// Reject configurations the reranker cannot honor.
    pub fn validate(&self) -> Result<(), ComposeError> {
        if !(0.0..=1.0).contains(&self.mmr_lambda) {
            return Err(ComposeError::InvalidConfig(format!(
                "MMR_LAMBDA must be in [0, 1], got {}",
                self.mmr_lambda
            )));
        }
        if self.final_count == 0 {
            return Err(ComposeError::InvalidConfig(
                "MMR_FINAL_COUNT must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
