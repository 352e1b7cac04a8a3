//! Infrastructure services

mod embedding_cache_service;

pub use embedding_cache_service::{
    EmbeddingCacheService, EmbeddingCacheServiceTrait, DEFAULT_SIMILARITY_THRESHOLD,
};
