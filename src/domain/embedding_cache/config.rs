//! Embedding cache configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the tiered embedding cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingCacheConfig {
    /// Maximum number of entries in the local table
    #[serde(default = "default_max_local_entries")]
    pub max_local_entries: usize,

    /// Time-to-live for entries in both tiers, in seconds
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// Cost attributed to one embedding call, credited on every hit
    #[serde(default = "default_cost_per_request")]
    pub cost_per_request: f64,

    /// Upper bound on any single persistent store call, in milliseconds
    #[serde(default = "default_store_timeout_ms")]
    pub store_timeout_ms: u64,

    /// Stop words added to the built-in set
    #[serde(default)]
    pub extra_stop_words: Vec<String>,
}

fn default_max_local_entries() -> usize {
    1000
}

fn default_ttl_secs() -> u64 {
    7 * 24 * 3600
}

fn default_cost_per_request() -> f64 {
    0.001
}

fn default_store_timeout_ms() -> u64 {
    250
}

impl Default for EmbeddingCacheConfig {
    fn default() -> Self {
        Self {
            max_local_entries: default_max_local_entries(),
            ttl_secs: default_ttl_secs(),
            cost_per_request: default_cost_per_request(),
            store_timeout_ms: default_store_timeout_ms(),
            extra_stop_words: Vec::new(),
        }
    }
}

impl EmbeddingCacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn with_max_local_entries(mut self, max: usize) -> Self {
        self.max_local_entries = max;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl_secs = ttl.as_secs();
        self
    }

    pub fn with_cost_per_request(mut self, cost: f64) -> Self {
        self.cost_per_request = cost.max(0.0);
        self
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_extra_stop_words(mut self, words: Vec<String>) -> Self {
        self.extra_stop_words = words;
        self
    }
}
