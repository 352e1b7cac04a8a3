//! Cached embedding record

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// A single cached embedding, as held locally and serialized into the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedEmbedding {
    vector: Vec<f32>,
    created_at: DateTime<Utc>,
    ttl_seconds: u64,
    #[serde(default)]
    hit_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cluster_key: Option<String>,
}

impl CachedEmbedding {
    pub fn new(vector: Vec<f32>, created_at: DateTime<Utc>, ttl_seconds: u64) -> Self {
        Self {
            vector,
            created_at,
            ttl_seconds,
            hit_count: 0,
            cluster_key: None,
        }
    }

    /// Records the cluster key this entry was also filed under
    pub fn with_cluster_key(mut self, cluster_key: impl Into<String>) -> Self {
        self.cluster_key = Some(cluster_key.into());
        self
    }

    pub fn vector(&self) -> &[f32] {
        &self.vector
    }

    pub fn dimensions(&self) -> usize {
        self.vector.len()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    pub fn hit_count(&self) -> u64 {
        self.hit_count
    }

    pub fn cluster_key(&self) -> Option<&str> {
        self.cluster_key.as_deref()
    }

    /// Expired once strictly more than `ttl_seconds` have elapsed
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        let ttl = i64::try_from(self.ttl_seconds)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX);
        now.signed_duration_since(self.created_at) > ttl
    }

    pub(crate) fn record_hit(&mut self) {
        self.hit_count = self.hit_count.saturating_add(1);
    }
}
