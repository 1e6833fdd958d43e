use prometheus::{IntCounter, IntCounterVec, Opts};
use tracing::warn;

/// Prometheus counters for feed composition, registered on the default
/// registry with a `service` const label.
#[derive(Clone)]
pub struct ComposerMetrics {
    pub compositions: IntCounter,
    /// Non-personalized source failures the composer degraded around,
    /// labeled by source.
    pub degraded_sources: IntCounterVec,
}

impl ComposerMetrics {
    pub fn new(service: &str) -> Self {
        let registry = prometheus::default_registry();

        let compositions = IntCounter::with_opts(
            Opts::new(
                "feed_compositions_total",
                "Total feed compositions served",
            )
            .const_label("service", service.to_string()),
        )
        .expect("valid metric opts for feed_compositions_total");

        let degraded_sources = IntCounterVec::new(
            Opts::new(
                "feed_degraded_sources_total",
                "Total candidate source failures degraded around",
            )
            .const_label("service", service.to_string()),
            &["source"],
        )
        .expect("valid metric opts for feed_degraded_sources_total");

        for metric in [
            Box::new(compositions.clone()) as Box<dyn prometheus::core::Collector>,
            Box::new(degraded_sources.clone()),
        ] {
            if let Err(e) = registry.register(metric) {
                warn!("Failed to register composer metric: {}", e);
            }
        }

        Self {
            compositions,
            degraded_sources,
        }
    }
}
