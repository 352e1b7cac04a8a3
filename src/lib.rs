//! Property Embedding Cache
//!
//! Multi-level cache in front of a sentence-embedding model for property
//! search queries:
//! - Query normalization and concept clustering for cache keys
//! - In-process table, persistent store (Redis or in-memory) and cold generation
//! - Hit/miss, cost and latency accounting

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use tracing::info;

use infrastructure::cache::CacheFactory;
use infrastructure::embedding::EmbeddingProviderFactory;
use infrastructure::services::EmbeddingCacheService;

/// Create the embedding cache with default configuration
pub async fn create_embedding_cache() -> anyhow::Result<Arc<EmbeddingCacheService>> {
    create_embedding_cache_with_config(&AppConfig::default()).await
}

/// Create the embedding cache from application configuration
pub async fn create_embedding_cache_with_config(
    config: &AppConfig,
) -> anyhow::Result<Arc<EmbeddingCacheService>> {
    let store = CacheFactory::new()
        .create_with_fallback(&config.store)
        .await?;
    let provider = EmbeddingProviderFactory::create(&config.embedding)?;

    info!(
        store = %config.store.cache_type,
        provider = %config.embedding.provider,
        max_local_entries = config.cache.max_local_entries,
        ttl_secs = config.cache.ttl_secs,
        "Embedding cache created"
    );

    Ok(Arc::new(EmbeddingCacheService::with_config(
        store,
        provider,
        config.cache.clone(),
    )))
}
