use prometheus::{IntCounter, Opts};
use tracing::warn;

/// Prometheus counters for the recompute worker, registered on the
/// default registry with a `service` const label.
#[derive(Clone)]
pub struct EngineMetrics {
    pub jobs_completed: IntCounter,
    pub jobs_skipped: IntCounter,
    pub jobs_retried: IntCounter,
    pub jobs_dead_lettered: IntCounter,
}

impl EngineMetrics {
    pub fn new(service: &str) -> Self {
        let registry = prometheus::default_registry();

        let jobs_completed = IntCounter::with_opts(
            Opts::new(
                "recompute_jobs_completed_total",
                "Total recompute jobs that persisted a new preference state",
            )
            .const_label("service", service.to_string()),
        )
        .expect("valid metric opts for recompute_jobs_completed_total");

        let jobs_skipped = IntCounter::with_opts(
            Opts::new(
                "recompute_jobs_skipped_total",
                "Total recompute jobs completed as benign no-ops",
            )
            .const_label("service", service.to_string()),
        )
        .expect("valid metric opts for recompute_jobs_skipped_total");

        let jobs_retried = IntCounter::with_opts(
            Opts::new(
                "recompute_jobs_retried_total",
                "Total recompute job attempts that failed and were retried",
            )
            .const_label("service", service.to_string()),
        )
        .expect("valid metric opts for recompute_jobs_retried_total");

        let jobs_dead_lettered = IntCounter::with_opts(
            Opts::new(
                "recompute_jobs_dead_lettered_total",
                "Total recompute jobs moved to the dead set",
            )
            .const_label("service", service.to_string()),
        )
        .expect("valid metric opts for recompute_jobs_dead_lettered_total");

        for metric in [
            Box::new(jobs_completed.clone()) as Box<dyn prometheus::core::Collector>,
            Box::new(jobs_skipped.clone()),
            Box::new(jobs_retried.clone()),
            Box::new(jobs_dead_lettered.clone()),
        ] {
            if let Err(e) = registry.register(metric) {
                warn!("Failed to register recompute metric: {}", e);
            }
        }

        Self {
            jobs_completed,
            jobs_skipped,
            jobs_retried,
            jobs_dead_lettered,
        }
    }
}
