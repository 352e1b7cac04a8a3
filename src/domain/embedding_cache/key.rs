//! Cache key derivation

use xxhash_rust::xxh64::xxh64;

use super::{ConceptClusterer, QueryNormalizer};

/// Prefix of exact (fully normalized) keys
pub const EXACT_KEY_PREFIX: &str = "emb";
/// Prefix of semantic cluster keys
pub const CLUSTER_KEY_PREFIX: &str = "cluster";

/// Store keys derived from one raw query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryKeys {
    /// Normalized query text the exact key hashes
    pub normalized: String,
    /// Concept-clustered text the cluster key hashes
    pub clustered: String,
    /// `emb:<xxh64 hex>`
    pub exact: String,
    /// `cluster:<xxh64 hex>`
    pub cluster: String,
}

/// Derives exact and cluster keys from raw query text
#[derive(Debug, Clone, Default)]
pub struct CacheKeyDeriver {
    normalizer: QueryNormalizer,
    clusterer: ConceptClusterer,
}

impl CacheKeyDeriver {
    pub fn new(normalizer: QueryNormalizer, clusterer: ConceptClusterer) -> Self {
        Self {
            normalizer,
            clusterer,
        }
    }

    pub fn normalizer(&self) -> &QueryNormalizer {
        &self.normalizer
    }

    pub fn clusterer(&self) -> &ConceptClusterer {
        &self.clusterer
    }

    pub fn normalize(&self, query: &str) -> String {
        self.normalizer.normalize(query)
    }

    pub fn exact_key(&self, query: &str) -> String {
        hashed_key(EXACT_KEY_PREFIX, &self.normalize(query))
    }

    pub fn cluster_key(&self, query: &str) -> String {
        let tokens = self.normalizer.tokens(query);
        hashed_key(CLUSTER_KEY_PREFIX, &self.clusterer.cluster(&tokens))
    }

    /// Derives both keys with a single normalization pass
    pub fn derive(&self, query: &str) -> QueryKeys {
        let tokens = self.normalizer.tokens(query);
        let normalized = tokens.join(" ");
        let clustered = self.clusterer.cluster(&tokens);

        QueryKeys {
            exact: hashed_key(EXACT_KEY_PREFIX, &normalized),
            cluster: hashed_key(CLUSTER_KEY_PREFIX, &clustered),
            normalized,
            clustered,
        }
    }
}

/// `<prefix>:<16 hex digits of xxh64(text, seed 0)>`
pub fn hashed_key(prefix: &str, text: &str) -> String {
    format!("{}:{:016x}", prefix, xxh64(text.as_bytes(), 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_shape() {
        let deriver = CacheKeyDeriver::default();
        let keys = deriver.derive("Luxury apartment in London");

        assert!(keys.exact.starts_with("emb:"));
        assert!(keys.cluster.starts_with("cluster:"));
        assert_eq!(keys.exact.len(), "emb:".len() + 16);
        assert_eq!(keys.cluster.len(), "cluster:".len() + 16);
        assert_eq!(keys.normalized, "apartment london luxury");
    }

    #[test]
    fn test_known_xxh64_digest() {
        // xxh64("", 0) is a published test vector
        assert_eq!(hashed_key("emb", ""), "emb:ef46db3751d8e999");
    }

    #[test]
    fn test_derive_matches_single_key_helpers() {
        let deriver = CacheKeyDeriver::default();
        let query = "Cheap 2bed flat near Brum";
        let keys = deriver.derive(query);

        assert_eq!(keys.exact, deriver.exact_key(query));
        assert_eq!(keys.cluster, deriver.cluster_key(query));
    }

    #[test]
    fn test_word_order_gives_same_exact_key() {
        let deriver = CacheKeyDeriver::default();

        assert_eq!(
            deriver.exact_key("2 bedroom flat London"),
            deriver.exact_key("London flat 2 bedroom")
        );
    }

    #[test]
    fn test_synonyms_share_cluster_key_only() {
        let deriver = CacheKeyDeriver::default();
        let flat = deriver.derive("flat in London");
        let apartment = deriver.derive("apartment in London");
        let apt = deriver.derive("apt in London");

        assert_eq!(flat.cluster, apartment.cluster);
        assert_eq!(apartment.cluster, apt.cluster);
        assert_ne!(flat.exact, apartment.exact);
        assert_ne!(apartment.exact, apt.exact);
    }

    #[test]
    fn test_exact_and_cluster_namespaces_disjoint() {
        let deriver = CacheKeyDeriver::default();
        let keys = deriver.derive("garden");

        // Same hashed text, different prefixes
        assert_eq!(keys.normalized, keys.clustered);
        assert_ne!(keys.exact, keys.cluster);
    }
}
