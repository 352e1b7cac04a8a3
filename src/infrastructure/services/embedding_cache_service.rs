//! Multi-tier embedding cache service
//!
//! Resolves a query through, in order: the in-process table, the
//! persistent store by exact key, the persistent store by concept-cluster
//! key, and finally the embedding provider. The first tier holding a live
//! vector wins; a cold generation is written back to every tier.

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::cache::{Cache, CacheExt};
use crate::domain::embedding::{cosine_similarity, EmbeddingProvider};
use crate::domain::embedding_cache::{
    CacheKeyDeriver, CacheStats, CacheStatsReport, CacheTier, CachedEmbedding, Clock,
    ConceptClusterer, EmbeddingCacheConfig, EmbeddingLookup, LocalEmbeddingTable, LocalLookup,
    PreloadSummary, QueryNormalizer, SimilarQuery, SystemClock, CLUSTER_KEY_PREFIX,
    EXACT_KEY_PREFIX,
};
use crate::domain::DomainError;
use crate::infrastructure::observability::{
    record_cache_lookup, record_eviction, record_generation, record_store_error,
};

/// Upper bound on the pattern deletes issued by `clear_cache`
const CLEAR_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum matches returned by `find_similar`
const MAX_SIMILAR: usize = 5;

/// Similarity threshold used when callers have no preference
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.8;

/// Embedding cache shared by every request handler in the process
#[derive(Debug)]
pub struct EmbeddingCacheService {
    store: Arc<dyn Cache>,
    provider: Option<Arc<dyn EmbeddingProvider>>,
    keys: CacheKeyDeriver,
    local: Mutex<LocalEmbeddingTable>,
    stats: Mutex<CacheStats>,
    config: EmbeddingCacheConfig,
    clock: Arc<dyn Clock>,
}

impl EmbeddingCacheService {
    /// Create a service with default configuration
    pub fn new(store: Arc<dyn Cache>, provider: Option<Arc<dyn EmbeddingProvider>>) -> Self {
        Self::with_config(store, provider, EmbeddingCacheConfig::default())
    }

    /// Create a service with custom configuration
    pub fn with_config(
        store: Arc<dyn Cache>,
        provider: Option<Arc<dyn EmbeddingProvider>>,
        config: EmbeddingCacheConfig,
    ) -> Self {
        let normalizer = QueryNormalizer::new().with_stop_words(config.extra_stop_words.clone());
        let keys = CacheKeyDeriver::new(normalizer, ConceptClusterer::new());

        Self {
            store,
            provider,
            keys,
            local: Mutex::new(LocalEmbeddingTable::new(config.max_local_entries)),
            stats: Mutex::new(CacheStats::new()),
            config,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock used for entry timestamps and expiry checks
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &EmbeddingCacheConfig {
        &self.config
    }

    pub fn keys(&self) -> &CacheKeyDeriver {
        &self.keys
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Resolve `query` to a vector, reporting which tier served it
    pub async fn lookup(&self, query: &str) -> Result<EmbeddingLookup, DomainError> {
        let started = Instant::now();
        let keys = self.keys.derive(query);
        let now = self.clock.now();

        let local = self.local.lock().await.get(&keys.exact, now);
        match local {
            LocalLookup::Hit(vector) => {
                return Ok(self.finish_hit(vector, CacheTier::Local, started).await);
            }
            LocalLookup::Expired => {
                debug!(key = %keys.exact, "Local entry expired");
            }
            LocalLookup::Absent => {}
        }

        if let Some(entry) = self.store_get(&keys.exact).await {
            let vector = entry.vector().to_vec();
            self.insert_local(keys.exact, entry).await;

            return Ok(self.finish_hit(vector, CacheTier::StoreExact, started).await);
        }

        if let Some(entry) = self.store_get(&keys.cluster).await {
            debug!(
                cluster = %keys.cluster,
                clustered = %keys.clustered,
                "Cluster hit, backfilling exact key"
            );

            let vector = entry.vector().to_vec();
            self.store_set(&keys.exact, &entry).await;
            self.insert_local(keys.exact, entry).await;

            return Ok(self.finish_hit(vector, CacheTier::StoreCluster, started).await);
        }

        let provider = self.provider.as_ref().ok_or_else(|| {
            DomainError::embedding_unavailable(format!(
                "no embedding provider configured and no cached vector for '{}'",
                query
            ))
        })?;

        let generation_started = Instant::now();
        let generated = provider.embed_text(query).await;
        let generation = generation_started.elapsed();
        record_generation(provider.provider_name(), generation, generated.is_ok());

        let vector = generated?;
        let entry = CachedEmbedding::new(vector.clone(), self.clock.now(), self.config.ttl_secs)
            .with_cluster_key(keys.cluster.clone());

        self.insert_local(keys.exact.clone(), entry.clone()).await;
        self.store_set(&keys.exact, &entry).await;
        self.store_set(&keys.cluster, &entry).await;

        self.stats.lock().await.record_miss(generation);
        record_cache_lookup(CacheTier::Generated, started.elapsed());
        debug!(
            key = %keys.exact,
            normalized = %keys.normalized,
            generation_ms = generation.as_millis() as u64,
            "Generated embedding"
        );

        Ok(EmbeddingLookup {
            vector,
            tier: CacheTier::Generated,
        })
    }

    /// Resolve `query` to a vector through the cache tiers
    pub async fn get_or_generate(&self, query: &str) -> Result<Vec<f32>, DomainError> {
        Ok(self.lookup(query).await?.vector)
    }

    /// Snapshot of the current epoch's counters
    pub async fn get_stats(&self) -> CacheStatsReport {
        let local_cache_size = self.local.lock().await.len();
        self.stats.lock().await.report(local_cache_size)
    }

    /// Empty the local table, reset stats and drop every cache key in the store
    ///
    /// Store failures are logged; local state is cleared regardless.
    /// Returns the number of store keys deleted.
    pub async fn clear_cache(&self) -> usize {
        self.local.lock().await.clear();
        *self.stats.lock().await = CacheStats::new();

        let mut deleted = 0;

        for prefix in [EXACT_KEY_PREFIX, CLUSTER_KEY_PREFIX] {
            let pattern = format!("{}:*", prefix);

            match tokio::time::timeout(CLEAR_TIMEOUT, self.store.delete_pattern(&pattern)).await {
                Ok(Ok(count)) => deleted += count,
                Ok(Err(e)) => {
                    record_store_error("delete");
                    warn!(pattern = %pattern, error = %e, "Failed to clear store keys");
                }
                Err(_) => {
                    record_store_error("delete");
                    warn!(pattern = %pattern, "Timed out clearing store keys");
                }
            }
        }

        info!(store_keys_deleted = deleted, "Embedding cache cleared");
        deleted
    }

    /// Warm the cache with `queries`, one at a time
    ///
    /// A failing query is logged and skipped.
    pub async fn preload(&self, queries: &[String]) -> PreloadSummary {
        info!(count = queries.len(), "Preloading common queries");

        let mut summary = PreloadSummary {
            requested: queries.len(),
            ..Default::default()
        };

        for query in queries {
            match self.lookup(query).await {
                Ok(_) => summary.loaded += 1,
                Err(e) => {
                    summary.failed += 1;
                    warn!(query = %query, error = %e, "Failed to preload query");
                }
            }
        }

        info!(
            loaded = summary.loaded,
            failed = summary.failed,
            "Preloading complete"
        );
        summary
    }

    /// Locally cached queries whose vectors lie within `threshold` cosine
    /// similarity of `query`, best first
    ///
    /// Embeds `query` through the cache, so it counts as a lookup and is
    /// typically its own best match. Empty without a provider.
    pub async fn find_similar(
        &self,
        query: &str,
        threshold: f32,
    ) -> Result<Vec<SimilarQuery>, DomainError> {
        if self.provider.is_none() {
            return Ok(Vec::new());
        }

        let target = self.get_or_generate(query).await?;
        let now = self.clock.now();

        let mut similar: Vec<SimilarQuery> = {
            let local = self.local.lock().await;

            local
                .iter()
                .filter(|(_, entry)| !entry.is_expired_at(now))
                .map(|(key, entry)| SimilarQuery {
                    cache_key: key.to_string(),
                    similarity: cosine_similarity(&target, entry.vector()),
                    hit_count: entry.hit_count(),
                })
                .filter(|candidate| candidate.similarity >= threshold)
                .collect()
        };

        similar.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(Ordering::Equal)
                .then_with(|| b.hit_count.cmp(&a.hit_count))
                .then_with(|| a.cache_key.cmp(&b.cache_key))
        });
        similar.truncate(MAX_SIMILAR);

        Ok(similar)
    }

    async fn finish_hit(
        &self,
        vector: Vec<f32>,
        tier: CacheTier,
        started: Instant,
    ) -> EmbeddingLookup {
        let elapsed = started.elapsed();

        self.stats
            .lock()
            .await
            .record_hit(self.config.cost_per_request, elapsed);
        record_cache_lookup(tier, elapsed);
        debug!(tier = %tier, "Embedding cache hit");

        EmbeddingLookup { vector, tier }
    }

    async fn insert_local(&self, key: String, entry: CachedEmbedding) {
        let evicted = self.local.lock().await.insert(key, entry);

        if let Some(evicted) = evicted {
            record_eviction();
            debug!(key = %evicted, "Evicted least-used local entry");
        }
    }

    /// Store read; failures, timeouts, undecodable and stale payloads all read as absent
    async fn store_get(&self, key: &str) -> Option<CachedEmbedding> {
        let read = tokio::time::timeout(
            self.config.store_timeout(),
            self.store.get::<CachedEmbedding>(key),
        )
        .await;

        let entry = match read {
            Ok(Ok(entry)) => entry?,
            Ok(Err(e)) => {
                record_store_error("get");
                warn!(key = %key, error = %e, "Store read failed, treating as miss");
                return None;
            }
            Err(_) => {
                record_store_error("get");
                warn!(key = %key, "Store read timed out, treating as miss");
                return None;
            }
        };

        if entry.is_expired_at(self.clock.now()) {
            debug!(key = %key, "Store entry past its TTL");
            return None;
        }

        Some(entry)
    }

    /// Store write; failures and timeouts are logged and skipped
    async fn store_set(&self, key: &str, entry: &CachedEmbedding) {
        let write = tokio::time::timeout(
            self.config.store_timeout(),
            self.store.set(key, entry, self.config.ttl()),
        )
        .await;

        match write {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                record_store_error("set");
                warn!(key = %key, error = %e, "Store write failed, skipping");
            }
            Err(_) => {
                record_store_error("set");
                warn!(key = %key, "Store write timed out, skipping");
            }
        }
    }
}

/// Caller-facing operations of the embedding cache
#[async_trait]
pub trait EmbeddingCacheServiceTrait: Send + Sync + std::fmt::Debug {
    /// Resolve a query to its embedding vector
    async fn get_or_generate(&self, query: &str) -> Result<Vec<f32>, DomainError>;

    /// Current hit/miss and savings figures
    async fn get_stats(&self) -> CacheStatsReport;

    /// Drop every cached vector and reset stats
    async fn clear_cache(&self) -> usize;

    /// Warm the cache with a batch of queries
    async fn preload(&self, queries: &[String]) -> PreloadSummary;

    /// Cached queries similar to `query`
    async fn find_similar(
        &self,
        query: &str,
        threshold: f32,
    ) -> Result<Vec<SimilarQuery>, DomainError>;
}

#[async_trait]
impl EmbeddingCacheServiceTrait for EmbeddingCacheService {
    async fn get_or_generate(&self, query: &str) -> Result<Vec<f32>, DomainError> {
        EmbeddingCacheService::get_or_generate(self, query).await
    }

    async fn get_stats(&self) -> CacheStatsReport {
        EmbeddingCacheService::get_stats(self).await
    }

    async fn clear_cache(&self) -> usize {
        EmbeddingCacheService::clear_cache(self).await
    }

    async fn preload(&self, queries: &[String]) -> PreloadSummary {
        EmbeddingCacheService::preload(self, queries).await
    }

    async fn find_similar(
        &self,
        query: &str,
        threshold: f32,
    ) -> Result<Vec<SimilarQuery>, DomainError> {
        EmbeddingCacheService::find_similar(self, query, threshold).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::MockCache;
    use crate::domain::embedding::MockEmbeddingProvider;
    use crate::domain::embedding_cache::ManualClock;
    use crate::infrastructure::cache::InMemoryCache;
    use chrono::{TimeDelta, TimeZone, Utc};

    const DIMS: usize = 8;

    struct Harness {
        service: EmbeddingCacheService,
        store: Arc<MockCache>,
        provider: Arc<MockEmbeddingProvider>,
        clock: Arc<ManualClock>,
    }

    fn harness_with(store: MockCache, config: EmbeddingCacheConfig) -> Harness {
        let store = Arc::new(store);
        let provider = Arc::new(MockEmbeddingProvider::new(DIMS));
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
        ));

        let service = EmbeddingCacheService::with_config(
            store.clone(),
            Some(provider.clone() as Arc<dyn EmbeddingProvider>),
            config,
        )
        .with_clock(clock.clone());

        Harness {
            service,
            store,
            provider,
            clock,
        }
    }

    fn harness() -> Harness {
        harness_with(MockCache::new(), EmbeddingCacheConfig::default())
    }

    #[tokio::test]
    async fn test_second_lookup_is_a_local_hit() {
        let h = harness();

        let first = h.service.lookup("3 bed house in Bristol").await.unwrap();
        let stats = h.service.get_stats().await;
        let second = h.service.lookup("3 bed house in Bristol").await.unwrap();
        let after = h.service.get_stats().await;

        assert_eq!(first.tier, CacheTier::Generated);
        assert_eq!(second.tier, CacheTier::Local);
        assert_eq!(first.vector, second.vector);
        assert_eq!(after.cache_hits, stats.cache_hits + 1);
        assert_eq!(after.cache_misses, stats.cache_misses);
        assert_eq!(h.provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_hit_miss_sequence() {
        let h = harness();

        for query in ["query1", "query2", "query1", "query3", "query1"] {
            h.service.get_or_generate(query).await.unwrap();
        }

        let stats = h.service.get_stats().await;
        assert_eq!(stats.cache_misses, 3);
        assert_eq!(stats.cache_hits, 2);
        assert_eq!(stats.total_requests, 5);
        assert_eq!(stats.hit_rate_percent, 40.0);
        assert_eq!(stats.cost_saved, 0.002);
        assert_eq!(stats.estimated_monthly_savings, 0.06);
        assert_eq!(stats.local_cache_size, 3);
    }

    #[tokio::test]
    async fn test_empty_stats() {
        let h = harness();
        let stats = h.service.get_stats().await;

        assert_eq!(stats.total_requests, 0);
        assert_eq!(stats.hit_rate_percent, 0.0);
        assert_eq!(stats.estimated_monthly_savings, 0.0);
    }

    #[tokio::test]
    async fn test_hit_rate_stays_in_bounds() {
        let h = harness();

        for i in 0..20 {
            h.service.get_or_generate(&format!("query {}", i % 4)).await.unwrap();
            let rate = h.service.get_stats().await.hit_rate_percent;
            assert!((0.0..=100.0).contains(&rate));
        }
    }

    #[tokio::test]
    async fn test_generation_embeds_raw_query_and_writes_all_tiers() {
        let h = harness();

        h.service.get_or_generate("Flat, in LONDON!").await.unwrap();

        assert_eq!(h.provider.texts(), vec!["Flat, in LONDON!".to_string()]);

        let keys = h.service.keys().derive("Flat, in LONDON!");
        assert!(h.store.contains(&keys.exact));
        assert!(h.store.contains(&keys.cluster));
        assert_eq!(h.store.ttl_of(&keys.exact), Some(Duration::from_secs(604_800)));
        assert_eq!(h.store.ttl_of(&keys.cluster), Some(Duration::from_secs(604_800)));

        let stored: CachedEmbedding = h.store.get(&keys.exact).await.unwrap().unwrap();
        assert_eq!(stored.cluster_key(), Some(keys.cluster.as_str()));
        assert_eq!(stored.ttl_seconds(), 604_800);
    }

    #[tokio::test]
    async fn test_reordered_query_hits_same_entry() {
        let h = harness();

        h.service.get_or_generate("luxury apartment London").await.unwrap();
        let second = h.service.lookup("Luxury apartment in London").await.unwrap();

        assert!(second.tier.is_hit());
        assert_eq!(h.provider.calls(), 1);
        assert_eq!(h.service.get_stats().await.cache_hits, 1);
    }

    #[tokio::test]
    async fn test_synonym_resolves_via_cluster_and_backfills() {
        let h = harness();

        let flat = h.service.lookup("flat in London").await.unwrap();
        let apartment = h.service.lookup("apartment in London").await.unwrap();

        assert_eq!(apartment.tier, CacheTier::StoreCluster);
        assert_eq!(apartment.vector, flat.vector);
        assert_eq!(h.provider.calls(), 1);

        let apartment_key = h.service.keys().exact_key("apartment in London");
        assert!(h.store.contains(&apartment_key));

        let again = h.service.lookup("apartment in London").await.unwrap();
        assert_eq!(again.tier, CacheTier::Local);

        let apt = h.service.lookup("apt in London").await.unwrap();
        assert_eq!(apt.tier, CacheTier::StoreCluster);

        let stats = h.service.get_stats().await;
        assert_eq!(stats.cache_misses, 1);
        assert_eq!(stats.cache_hits, 3);
    }

    #[tokio::test]
    async fn test_store_exact_hit_populates_local() {
        let h = harness();
        let keys = h.service.keys().derive("semi detached Leeds");
        let entry = CachedEmbedding::new(vec![0.1; DIMS], h.clock.now(), 3600);
        h.store.set(&keys.exact, &entry, Duration::from_secs(3600)).await.unwrap();

        let first = h.service.lookup("Leeds semi detached").await.unwrap();
        let second = h.service.lookup("semi detached Leeds").await.unwrap();

        assert_eq!(first.tier, CacheTier::StoreExact);
        assert_eq!(second.tier, CacheTier::Local);
        assert_eq!(first.vector, vec![0.1; DIMS]);
        assert_eq!(h.provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_expired_entry_is_regenerated() {
        let ttl = Duration::from_secs(60);
        let h = harness_with(MockCache::new(), EmbeddingCacheConfig::default().with_ttl(ttl));

        h.service.get_or_generate("bungalow near the sea").await.unwrap();
        h.clock.advance(TimeDelta::seconds(61));

        let again = h.service.lookup("bungalow near the sea").await.unwrap();

        assert_eq!(again.tier, CacheTier::Generated);
        assert_eq!(h.provider.calls(), 2);

        let stats = h.service.get_stats().await;
        assert_eq!(stats.cache_misses, 2);
        assert_eq!(stats.cache_hits, 0);
    }

    #[tokio::test]
    async fn test_entry_within_ttl_still_hits() {
        let ttl = Duration::from_secs(60);
        let h = harness_with(MockCache::new(), EmbeddingCacheConfig::default().with_ttl(ttl));

        h.service.get_or_generate("cottage").await.unwrap();
        h.clock.advance(TimeDelta::seconds(60));

        assert_eq!(
            h.service.lookup("cottage").await.unwrap().tier,
            CacheTier::Local
        );
    }

    #[tokio::test]
    async fn test_local_table_is_bounded() {
        let capacity = 3;
        let config = EmbeddingCacheConfig::default().with_max_local_entries(capacity);
        let h = harness_with(MockCache::new(), config);

        let queries = ["alpha", "bravo", "charlie", "delta"];
        for query in queries {
            h.service.get_or_generate(query).await.unwrap();
        }

        assert_eq!(h.service.get_stats().await.local_cache_size, capacity);

        // evicted locally, so the next read comes from the store
        let first = h.service.lookup("alpha").await.unwrap();
        assert_eq!(first.tier, CacheTier::StoreExact);
        assert_eq!(h.service.get_stats().await.local_cache_size, capacity);
    }

    #[tokio::test]
    async fn test_eviction_spares_frequently_hit_entries() {
        let config = EmbeddingCacheConfig::default().with_max_local_entries(2);
        let h = harness_with(MockCache::new(), config);

        h.service.get_or_generate("alpha").await.unwrap();
        h.service.get_or_generate("alpha").await.unwrap();
        h.service.get_or_generate("bravo").await.unwrap();
        h.service.get_or_generate("charlie").await.unwrap();

        assert_eq!(h.service.lookup("alpha").await.unwrap().tier, CacheTier::Local);
        assert_eq!(
            h.service.lookup("bravo").await.unwrap().tier,
            CacheTier::StoreExact
        );
    }

    #[tokio::test]
    async fn test_clear_cache_resets_everything() {
        let h = harness();
        h.store
            .set("session:keep", &"x", Duration::from_secs(60))
            .await
            .unwrap();

        h.service.get_or_generate("penthouse").await.unwrap();
        h.service.get_or_generate("penthouse").await.unwrap();

        let deleted = h.service.clear_cache().await;
        let stats = h.service.get_stats().await;

        assert_eq!(deleted, 2);
        assert_eq!(stats.total_requests, 0);
        assert_eq!(stats.local_cache_size, 0);
        assert_eq!(stats.cost_saved, 0.0);
        assert_eq!(h.store.keys(), vec!["session:keep".to_string()]);

        let after = h.service.lookup("penthouse").await.unwrap();
        assert_eq!(after.tier, CacheTier::Generated);
    }

    #[tokio::test]
    async fn test_clear_cache_survives_store_failure() {
        let h = harness();
        h.service.get_or_generate("maisonette").await.unwrap();
        h.store.set_error(Some("connection reset".into()));

        assert_eq!(h.service.clear_cache().await, 0);

        let stats = h.service.get_stats().await;
        assert_eq!(stats.total_requests, 0);
        assert_eq!(stats.local_cache_size, 0);
    }

    #[tokio::test]
    async fn test_store_errors_fall_back_to_generation() {
        let h = harness_with(
            MockCache::new().with_error("connection refused"),
            EmbeddingCacheConfig::default(),
        );

        let first = h.service.lookup("studio flat").await.unwrap();
        let second = h.service.lookup("studio flat").await.unwrap();

        assert_eq!(first.tier, CacheTier::Generated);
        assert_eq!(second.tier, CacheTier::Local);
        assert_eq!(h.store.writes(), 2);
    }

    #[tokio::test]
    async fn test_slow_store_times_out_to_generation() {
        let config =
            EmbeddingCacheConfig::default().with_store_timeout(Duration::from_millis(20));
        let h = harness_with(MockCache::new().with_delay(Duration::from_secs(5)), config);

        let started = Instant::now();
        let result = h.service.lookup("terraced house").await.unwrap();

        assert_eq!(result.tier, CacheTier::Generated);
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_corrupt_store_payload_is_a_miss() {
        let deriver = EmbeddingCacheService::new(Arc::new(MockCache::new()), None);
        let keys = deriver.keys().derive("loft");

        let h = harness_with(
            MockCache::new().with_raw_entry(&keys.exact, "not json"),
            EmbeddingCacheConfig::default(),
        );

        let result = h.service.lookup("loft").await.unwrap();
        assert_eq!(result.tier, CacheTier::Generated);
    }

    #[tokio::test]
    async fn test_no_provider_serves_cached_and_fails_on_miss() {
        let store = Arc::new(MockCache::new());
        let service = EmbeddingCacheService::new(store.clone(), None);
        let keys = service.keys().derive("castle");
        let entry = CachedEmbedding::new(vec![0.5; DIMS], Utc::now(), 3600);
        store.set(&keys.exact, &entry, Duration::from_secs(3600)).await.unwrap();

        assert_eq!(service.get_or_generate("castle").await.unwrap(), vec![0.5; DIMS]);

        let result = service.get_or_generate("windmill").await;
        assert!(matches!(result, Err(DomainError::EmbeddingUnavailable { .. })));

        let stats = service.get_stats().await;
        assert_eq!(stats.cache_hits, 1);
        assert_eq!(stats.cache_misses, 0);
    }

    #[tokio::test]
    async fn test_provider_failure_propagates_uncounted() {
        let h = harness();
        h.provider.set_error(Some("model offline".into()));

        let result = h.service.get_or_generate("barn conversion").await;

        assert!(matches!(result, Err(DomainError::Provider { .. })));
        assert_eq!(h.service.get_stats().await.total_requests, 0);
        assert_eq!(h.store.writes(), 0);
    }

    #[tokio::test]
    async fn test_preload_skips_failures() {
        let h = harness();
        h.service.get_or_generate("warm").await.unwrap();

        let store = Arc::new(MockCache::new());
        let service = EmbeddingCacheService::new(store, None);
        let summary = service
            .preload(&["a".to_string(), "b".to_string()])
            .await;
        assert_eq!(summary.failed, 2);

        let queries: Vec<String> = ["flat", "house", "flat"].iter().map(|q| q.to_string()).collect();
        let summary = h.service.preload(&queries).await;

        assert_eq!(
            summary,
            PreloadSummary {
                requested: 3,
                loaded: 3,
                failed: 0
            }
        );
        assert_eq!(h.provider.calls(), 3);
    }

    #[tokio::test]
    async fn test_find_similar() {
        let h = harness();

        h.service.get_or_generate("garden flat").await.unwrap();
        h.service.get_or_generate("riverside loft").await.unwrap();

        let similar = h.service.find_similar("garden flat", 0.999).await.unwrap();
        let own_key = h.service.keys().exact_key("garden flat");

        assert_eq!(similar[0].cache_key, own_key);
        assert!((similar[0].similarity - 1.0).abs() < 1e-5);
        assert_eq!(similar[0].hit_count, 1);

        let everything = h.service.find_similar("garden flat", -1.0).await.unwrap();
        assert_eq!(everything.len(), 2);
        assert!(everything[0].similarity >= everything[1].similarity);
    }

    #[tokio::test]
    async fn test_find_similar_returns_at_most_five() {
        let h = harness();

        for i in 0..8 {
            h.service.get_or_generate(&format!("listing {}", i)).await.unwrap();
        }

        let similar = h.service.find_similar("listing 0", -1.0).await.unwrap();
        assert_eq!(similar.len(), MAX_SIMILAR);
    }

    #[tokio::test]
    async fn test_find_similar_without_provider_is_empty() {
        let service = EmbeddingCacheService::new(Arc::new(MockCache::new()), None);
        assert!(service.find_similar("flat", 0.5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_with_in_memory_store() {
        let store: Arc<dyn Cache> = Arc::new(InMemoryCache::new());
        let provider = Arc::new(MockEmbeddingProvider::new(DIMS));
        let service: Arc<dyn EmbeddingCacheServiceTrait> =
            Arc::new(EmbeddingCacheService::new(
                store,
                Some(provider.clone() as Arc<dyn EmbeddingProvider>),
            ));

        service.get_or_generate("flat in Cardiff").await.unwrap();
        service.get_or_generate("apartment in Cardiff").await.unwrap();

        assert_eq!(provider.calls(), 1);
        assert_eq!(service.clear_cache().await, 3);
    }
}
