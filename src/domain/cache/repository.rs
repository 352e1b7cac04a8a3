//! Persistent store trait definition

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde::{de::DeserializeOwned, Serialize};

use crate::domain::DomainError;

/// Key/value store with per-entry expiry, used as the persistent cache tier
///
/// Values travel as JSON strings so the trait stays dyn-compatible.
/// Use [`CacheExt`] for typed get/set operations.
#[async_trait]
pub trait Cache: Send + Sync + Debug {
    /// Gets a raw JSON value from the store
    async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError>;

    /// Sets a raw JSON value in the store, expiring after `ttl`
    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError>;

    /// Deletes a value from the store
    async fn delete(&self, key: &str) -> Result<bool, DomainError>;

    /// Lists keys matching a glob pattern (`*` wildcard only)
    async fn scan_keys(&self, pattern: &str) -> Result<Vec<String>, DomainError>;

    /// Deletes every key matching a glob pattern
    async fn delete_pattern(&self, pattern: &str) -> Result<usize, DomainError> {
        let mut deleted = 0;

        for key in self.scan_keys(pattern).await? {
            if self.delete(&key).await? {
                deleted += 1;
            }
        }

        Ok(deleted)
    }

    /// Checks if a key exists in the store
    async fn exists(&self, key: &str) -> Result<bool, DomainError> {
        Ok(self.get_raw(key).await?.is_some())
    }

    /// Returns approximate number of entries in the store
    async fn size(&self) -> Result<usize, DomainError>;
}

/// Extension trait providing typed get/set operations
pub trait CacheExt: Cache {
    /// Gets a typed value from the store
    fn get<'a, V>(
        &'a self,
        key: &'a str,
    ) -> impl std::future::Future<Output = Result<Option<V>, DomainError>> + Send
    where
        V: DeserializeOwned + Send,
    {
        async move {
            match self.get_raw(key).await? {
                Some(data) => {
                    let value: V = serde_json::from_str(&data).map_err(|e| {
                        DomainError::cache(format!("Failed to deserialize cache value: {}", e))
                    })?;
                    Ok(Some(value))
                }
                None => Ok(None),
            }
        }
    }

    /// Sets a typed value in the store with a TTL
    fn set<'a, V>(
        &'a self,
        key: &'a str,
        value: &'a V,
        ttl: Duration,
    ) -> impl std::future::Future<Output = Result<(), DomainError>> + Send
    where
        V: Serialize + Send + Sync,
    {
        async move {
            let data = serde_json::to_string(value).map_err(|e| {
                DomainError::cache(format!("Failed to serialize cache value: {}", e))
            })?;
            self.set_raw(key, &data, ttl).await
        }
    }
}

impl<T: Cache + ?Sized> CacheExt for T {}

/// Compiles a store glob pattern (`emb:*`) into an anchored regex
pub fn glob_matcher(pattern: &str) -> Result<Regex, DomainError> {
    let escaped = regex::escape(pattern).replace(r"\*", ".*");

    Regex::new(&format!("^{}$", escaped))
        .map_err(|e| DomainError::cache(format!("Invalid pattern '{}': {}", pattern, e)))
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Mock store for testing
    ///
    /// Entries live in a `BTreeMap` so scans are ordered. Expiry is recorded
    /// but never enforced.
    #[derive(Debug, Default)]
    pub struct MockCache {
        entries: Mutex<BTreeMap<String, (String, Duration)>>,
        error: Mutex<Option<String>>,
        delay: Mutex<Option<Duration>>,
        reads: AtomicUsize,
        writes: AtomicUsize,
    }

    impl MockCache {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_entry<V: Serialize>(self, key: &str, value: &V, ttl: Duration) -> Self {
            let json = serde_json::to_string(value).unwrap();
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), (json, ttl));
            self
        }

        pub fn with_raw_entry(self, key: &str, raw: &str) -> Self {
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), (raw.to_string(), Duration::from_secs(60)));
            self
        }

        pub fn with_error(self, error: impl Into<String>) -> Self {
            self.set_error(Some(error.into()));
            self
        }

        /// Every call sleeps this long before answering
        pub fn with_delay(self, delay: Duration) -> Self {
            *self.delay.lock().unwrap() = Some(delay);
            self
        }

        pub fn set_error(&self, error: Option<String>) {
            *self.error.lock().unwrap() = error;
        }

        pub fn contains(&self, key: &str) -> bool {
            self.entries.lock().unwrap().contains_key(key)
        }

        pub fn ttl_of(&self, key: &str) -> Option<Duration> {
            self.entries.lock().unwrap().get(key).map(|(_, ttl)| *ttl)
        }

        pub fn keys(&self) -> Vec<String> {
            self.entries.lock().unwrap().keys().cloned().collect()
        }

        pub fn remove(&self, key: &str) {
            self.entries.lock().unwrap().remove(key);
        }

        pub fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }

        pub fn writes(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }

        async fn before_call(&self) -> Result<(), DomainError> {
            let delay = *self.delay.lock().unwrap();

            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            if let Some(error) = self.error.lock().unwrap().clone() {
                return Err(DomainError::cache(error));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl Cache for MockCache {
        async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.before_call().await?;
            let entries = self.entries.lock().unwrap();

            Ok(entries.get(key).map(|(json, _)| json.clone()))
        }

        async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.before_call().await?;
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), (value.to_string(), ttl));
            Ok(())
        }

        async fn delete(&self, key: &str) -> Result<bool, DomainError> {
            self.before_call().await?;
            Ok(self.entries.lock().unwrap().remove(key).is_some())
        }

        async fn scan_keys(&self, pattern: &str) -> Result<Vec<String>, DomainError> {
            self.before_call().await?;
            let matcher = glob_matcher(pattern)?;

            Ok(self
                .entries
                .lock()
                .unwrap()
                .keys()
                .filter(|k| matcher.is_match(k))
                .cloned()
                .collect())
        }

        async fn size(&self) -> Result<usize, DomainError> {
            self.before_call().await?;
            Ok(self.entries.lock().unwrap().len())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_mock_cache_set_get() {
            let cache = MockCache::new();
            cache
                .set("key1", &"value1", Duration::from_secs(60))
                .await
                .unwrap();

            let result: Option<String> = cache.get("key1").await.unwrap();
            assert_eq!(result, Some("value1".to_string()));
            assert_eq!(cache.ttl_of("key1"), Some(Duration::from_secs(60)));
        }

        #[tokio::test]
        async fn test_mock_cache_with_error() {
            let cache = MockCache::new().with_error("Test error");

            let result: Result<Option<String>, _> = cache.get("key").await;
            assert!(result.is_err());
        }

        #[tokio::test]
        async fn test_mock_cache_undecodable_value() {
            let cache = MockCache::new().with_raw_entry("key", "not json");

            let result: Result<Option<Vec<f32>>, _> = cache.get("key").await;
            assert!(matches!(result, Err(DomainError::Cache { .. })));
        }

        #[tokio::test]
        async fn test_default_delete_pattern() {
            let cache = MockCache::new();
            for key in ["emb:1", "emb:2", "cluster:1", "other:emb:3"] {
                cache.set(key, &1, Duration::from_secs(60)).await.unwrap();
            }

            let deleted = cache.delete_pattern("emb:*").await.unwrap();
            assert_eq!(deleted, 2);
            assert_eq!(cache.keys(), vec!["cluster:1", "other:emb:3"]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_matcher_prefix() {
        let matcher = glob_matcher("emb:*").unwrap();

        assert!(matcher.is_match("emb:0123456789abcdef"));
        assert!(!matcher.is_match("cluster:0123456789abcdef"));
        assert!(!matcher.is_match("xemb:1"));
    }

    #[test]
    fn test_glob_matcher_escapes_regex_characters() {
        let matcher = glob_matcher("a.b*").unwrap();

        assert!(matcher.is_match("a.b:1"));
        assert!(!matcher.is_match("axb:1"));
    }
}
