//! Embedding provider trait definition

use async_trait::async_trait;
use std::fmt::Debug;

use super::{EmbeddingRequest, EmbeddingResponse};
use crate::domain::DomainError;

/// Text embedding function consumed by the cache on a cold miss
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + Debug {
    /// Generate embeddings for the given request
    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, DomainError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;

    /// Get the model this provider embeds with
    fn model(&self) -> &str;

    /// Embed a single text with the provider's model
    async fn embed_text(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        let request = EmbeddingRequest::single(self.model(), text);

        self.embed(request).await?.into_first().ok_or_else(|| {
            DomainError::provider(self.provider_name(), "No embedding returned")
        })
    }
}
