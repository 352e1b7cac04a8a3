//! Offline feature-hashing embeddings
//!
//! Each lowercase word is hashed into one of `dimensions` buckets with a
//! sign taken from a separate hash bit, then the vector is L2-normalized.
//! Texts sharing words land close together; no network or model needed.

use async_trait::async_trait;
use xxhash_rust::xxh64::xxh64;

use crate::domain::embedding::{EmbeddingProvider, EmbeddingRequest, EmbeddingResponse};
use crate::domain::DomainError;

pub const DEFAULT_HASHING_MODEL: &str = "feature-hashing";

/// Deterministic embedding provider for development and tests
#[derive(Debug, Clone)]
pub struct HashingEmbeddingProvider {
    dimensions: usize,
    model: String,
}

impl HashingEmbeddingProvider {
    pub fn new(dimensions: usize) -> Result<Self, DomainError> {
        if dimensions == 0 {
            return Err(DomainError::configuration(
                "Hashing embeddings need at least one dimension",
            ));
        }

        Ok(Self {
            dimensions,
            model: DEFAULT_HASHING_MODEL.to_string(),
        })
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let hash = xxh64(token.to_lowercase().as_bytes(), 0);
            let bucket = (hash % self.dimensions as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }

        vector
    }
}

#[async_trait]
impl EmbeddingProvider for HashingEmbeddingProvider {
    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, DomainError> {
        let vectors = request.texts().iter().map(|t| self.embed_one(t)).collect();
        let tokens = request
            .texts()
            .iter()
            .map(|t| t.split_whitespace().count() as u32)
            .sum();

        Ok(EmbeddingResponse::new(&self.model, vectors, tokens))
    }

    fn provider_name(&self) -> &'static str {
        "hashing"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
