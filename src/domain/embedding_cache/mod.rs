//! Embedding cache domain models
//!
//! Query normalization, concept clustering, key derivation, the local tier
//! and the stats the tiered lookup maintains.

mod clock;
mod concepts;
mod config;
mod entry;
mod key;
mod local_table;
mod lookup;
mod normalizer;
mod stats;

pub use clock::{Clock, SystemClock};
pub use concepts::{ConceptClusterer, DEFAULT_CONCEPTS};
pub use config::EmbeddingCacheConfig;
pub use entry::CachedEmbedding;
pub use key::{hashed_key, CacheKeyDeriver, QueryKeys, CLUSTER_KEY_PREFIX, EXACT_KEY_PREFIX};
pub use local_table::{LocalEmbeddingTable, LocalLookup};
pub use lookup::{CacheTier, EmbeddingLookup, PreloadSummary, SimilarQuery};
pub use normalizer::{QueryNormalizer, DEFAULT_STOP_WORDS};
pub use stats::{CacheStats, CacheStatsReport};

#[cfg(test)]
pub use clock::mock::ManualClock;
