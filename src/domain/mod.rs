//! Domain layer - Core cache logic and entities

pub mod cache;
pub mod embedding;
pub mod embedding_cache;
pub mod error;

pub use cache::{Cache, CacheExt};
pub use embedding::{cosine_similarity, EmbeddingProvider, EmbeddingRequest, EmbeddingResponse};
pub use embedding_cache::{
    CacheKeyDeriver, CacheStats, CacheStatsReport, CacheTier, CachedEmbedding, Clock,
    ConceptClusterer, EmbeddingCacheConfig, EmbeddingLookup, LocalEmbeddingTable, PreloadSummary,
    QueryKeys, QueryNormalizer, SimilarQuery, SystemClock,
};
pub use error::DomainError;
