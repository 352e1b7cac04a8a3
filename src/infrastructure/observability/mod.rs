//! Observability infrastructure - Metrics

mod config;
mod metrics;

pub use config::MetricsConfig;
pub use metrics::{
    init_metrics, record_cache_lookup, record_eviction, record_generation, record_store_error,
    PrometheusMetrics,
};
