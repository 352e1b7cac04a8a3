//! Prometheus metrics for the embedding cache

use std::sync::Arc;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use super::config::MetricsConfig;
use crate::domain::CacheTier;

/// Handle for rendering the Prometheus exposition
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl std::fmt::Debug for PrometheusMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrometheusMetrics").finish_non_exhaustive()
    }
}

impl PrometheusMetrics {
    /// Current metrics in Prometheus text format
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Install the global Prometheus recorder
///
/// Returns `None` when disabled or when a recorder is already installed;
/// the `record_*` helpers are no-ops without one.
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::debug!("Prometheus metrics disabled");
        return None;
    }

    let builder =
        PrometheusBuilder::new().add_global_label("service", config.service_name.clone());

    match builder.install_recorder() {
        Ok(handle) => {
            gauge!("embedding_cache_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
            tracing::info!("Prometheus metrics initialized");

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

/// Record which tier served a lookup and how long it took
pub fn record_cache_lookup(tier: CacheTier, duration: Duration) {
    let labels = [("tier", tier.as_str())];

    counter!("embedding_cache_lookups_total", &labels).increment(1);
    histogram!("embedding_cache_lookup_duration_seconds", &labels)
        .record(duration.as_secs_f64());
}

/// Record a store read or write that failed or timed out
pub fn record_store_error(operation: &'static str) {
    counter!("embedding_cache_store_errors_total", "operation" => operation).increment(1);
}

/// Record a local-table eviction
pub fn record_eviction() {
    counter!("embedding_cache_evictions_total").increment(1);
}

/// Record a call to the embedding function
pub fn record_generation(provider: &'static str, duration: Duration, success: bool) {
    let status = if success { "success" } else { "error" };

    histogram!(
        "embedding_generation_duration_seconds",
        "provider" => provider,
        "status" => status
    )
    .record(duration.as_secs_f64());
}
