//! Worker configuration.

use tracing::warn;

/// Recompute worker configuration.
///
/// `concurrency` exists for parity with operational tooling but values
/// above 1 are clamped back to 1: the update is a read-modify-write
/// over a shared per-user accumulator, and concurrent execution of two
/// jobs for the same user corrupts `behavioral_weight_sum`.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Total attempts per job before dead-lettering.
    pub retry_attempts: u32,
    /// Base delay for exponential backoff between attempts.
    pub backoff_base_ms: u64,
    /// Worker concurrency for this job class. Hard-limited to 1.
    pub concurrency: usize,
    /// How many exhausted/fatal jobs to retain for inspection.
    pub dead_set_size: usize,
    /// How many completed job records to retain.
    pub completed_log_size: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            retry_attempts: 3,
            backoff_base_ms: 2000,
            concurrency: 1,
            dead_set_size: 50,
            completed_log_size: 100,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables, falling back to
    /// defaults on missing or unparseable values.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            retry_attempts: std::env::var("RECOMPUTE_RETRY_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.retry_attempts),
            backoff_base_ms: std::env::var("RECOMPUTE_BACKOFF_BASE_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.backoff_base_ms),
            concurrency: std::env::var("RECOMPUTE_CONCURRENCY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.concurrency),
            dead_set_size: std::env::var("RECOMPUTE_DEAD_SET_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.dead_set_size),
            completed_log_size: std::env::var("RECOMPUTE_COMPLETED_LOG_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.completed_log_size),
        }
    }

    /// Effective worker concurrency, clamped to 1.
    pub fn effective_concurrency(&self) -> usize {
        if self.concurrency > 1 {
            warn!(
                requested = self.concurrency,
                "recompute concurrency > 1 requested; clamping to 1 (per-user \
                 read-modify-write is not safe to parallelize)"
            );
        }
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_defaults() {
        let config = WorkerConfig::default();
        assert_eq!(config.retry_attempts, 3);
        assert_eq!(config.backoff_base_ms, 2000);
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.dead_set_size, 50);
        assert_eq!(config.completed_log_size, 100);
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        std::env::set_var("RECOMPUTE_RETRY_ATTEMPTS", "5");
        std::env::set_var("RECOMPUTE_BACKOFF_BASE_MS", "100");

        let config = WorkerConfig::from_env();
        assert_eq!(config.retry_attempts, 5);
        assert_eq!(config.backoff_base_ms, 100);
        assert_eq!(config.dead_set_size, 50);

        std::env::remove_var("RECOMPUTE_RETRY_ATTEMPTS");
        std::env::remove_var("RECOMPUTE_BACKOFF_BASE_MS");
    }

    #[test]
    #[serial]
    fn test_from_env_garbled_value_falls_back() {
        std::env::set_var("RECOMPUTE_RETRY_ATTEMPTS", "many");
        let config = WorkerConfig::from_env();
        assert_eq!(config.retry_attempts, 3);
        std::env::remove_var("RECOMPUTE_RETRY_ATTEMPTS");
    }

    #[test]
    #[serial]
    fn test_concurrency_clamped_to_one() {
        let config = WorkerConfig {
            concurrency: 8,
            ..Default::default()
        };
        assert_eq!(config.effective_concurrency(), 1);
    }
}
