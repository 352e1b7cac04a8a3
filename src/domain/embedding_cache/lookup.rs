//! Tiered lookup outcome

use serde::{Deserialize, Serialize};

/// Where a vector was found during a lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheTier {
    /// In-process table, keyed by the normalized query
    Local,
    /// Persistent store, exact key
    StoreExact,
    /// Persistent store, concept-cluster key
    StoreCluster,
    /// Cache miss; the embedding function produced the vector
    Generated,
}

impl CacheTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::StoreExact => "store_exact",
            Self::StoreCluster => "store_cluster",
            Self::Generated => "generated",
        }
    }

    pub fn is_hit(&self) -> bool {
        !matches!(self, Self::Generated)
    }
}

impl std::fmt::Display for CacheTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved vector and the tier that served it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbeddingLookup {
    pub vector: Vec<f32>,
    pub tier: CacheTier,
}

/// A cached query whose vector is close to a queried one
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarQuery {
    pub cache_key: String,
    pub similarity: f32,
    pub hit_count: u64,
}

/// Outcome of a preload batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PreloadSummary {
    pub requested: usize,
    pub loaded: usize,
    pub failed: usize,
}
