//! Store factory for runtime selection

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::{info, warn};

use crate::domain::cache::Cache;
use crate::domain::DomainError;

use super::in_memory::{InMemoryCache, InMemoryCacheConfig};
use super::redis::{RedisCache, RedisCacheConfig};

/// Supported store types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheType {
    /// In-process store using moka
    #[default]
    InMemory,
    /// Redis store
    Redis,
}

impl std::fmt::Display for CacheType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheType::InMemory => write!(f, "in_memory"),
            CacheType::Redis => write!(f, "redis"),
        }
    }
}

impl std::str::FromStr for CacheType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "in_memory" | "inmemory" | "memory" => Ok(CacheType::InMemory),
            "redis" => Ok(CacheType::Redis),
            _ => Err(DomainError::configuration(format!(
                "Unknown store type: {}. Valid types: in_memory, redis",
                s
            ))),
        }
    }
}

fn default_connection_timeout_ms() -> u64 {
    2_000
}

fn default_max_capacity() -> u64 {
    100_000
}

/// `store` section of the application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Type of store to create
    #[serde(default, rename = "type")]
    pub cache_type: CacheType,
    /// Redis URL (required for Redis type)
    #[serde(default)]
    pub url: Option<String>,
    /// Key prefix for namespacing
    #[serde(default)]
    pub key_prefix: Option<String>,
    /// How long to wait for Redis at startup
    #[serde(default = "default_connection_timeout_ms")]
    pub connection_timeout_ms: u64,
    /// Maximum entries (in-memory only)
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
    /// Use in-memory storage when Redis cannot be reached
    #[serde(default = "default_fallback")]
    pub fallback_to_memory: bool,
}

fn default_fallback() -> bool {
    true
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_type: CacheType::InMemory,
            url: None,
            key_prefix: None,
            connection_timeout_ms: default_connection_timeout_ms(),
            max_capacity: default_max_capacity(),
            fallback_to_memory: default_fallback(),
        }
    }
}

impl CacheConfig {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn redis(url: impl Into<String>) -> Self {
        Self {
            cache_type: CacheType::Redis,
            url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    pub fn with_max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = capacity;
        self
    }

    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_fallback_to_memory(mut self, enabled: bool) -> Self {
        self.fallback_to_memory = enabled;
        self
    }

    pub fn connection_timeout(&self) -> Duration {
        Duration::from_millis(self.connection_timeout_ms)
    }
}

/// Factory for creating store instances
#[derive(Debug, Default)]
pub struct CacheFactory;

impl CacheFactory {
    pub fn new() -> Self {
        Self
    }

    /// Creates the configured store, failing if Redis is unreachable
    pub async fn create(&self, config: &CacheConfig) -> Result<Arc<dyn Cache>, DomainError> {
        match config.cache_type {
            CacheType::InMemory => Ok(self.create_in_memory(config)),
            CacheType::Redis => {
                let url = config.url.clone().ok_or_else(|| {
                    DomainError::configuration("Redis URL is required for redis store type")
                })?;

                let mut redis_config =
                    RedisCacheConfig::new(url).with_connection_timeout(config.connection_timeout());

                if let Some(prefix) = &config.key_prefix {
                    redis_config = redis_config.with_key_prefix(prefix.clone());
                }

                let cache = RedisCache::new(redis_config).await?;
                info!(store = %config.cache_type, "Connected to Redis store");
                Ok(Arc::new(cache))
            }
        }
    }

    /// Like [`create`](Self::create), but degrades to in-memory storage
    /// when Redis is unreachable and `fallback_to_memory` is set
    pub async fn create_with_fallback(
        &self,
        config: &CacheConfig,
    ) -> Result<Arc<dyn Cache>, DomainError> {
        match self.create(config).await {
            Ok(cache) => Ok(cache),
            Err(DomainError::Cache { message })
                if config.cache_type == CacheType::Redis && config.fallback_to_memory =>
            {
                warn!(
                    error = %message,
                    "Redis store unavailable, falling back to in-memory store"
                );
                Ok(self.create_in_memory(config))
            }
            Err(e) => Err(e),
        }
    }

    fn create_in_memory(&self, config: &CacheConfig) -> Arc<dyn Cache> {
        let in_memory_config = InMemoryCacheConfig::default().with_max_capacity(config.max_capacity);
        Arc::new(InMemoryCache::with_config(in_memory_config))
    }
}
