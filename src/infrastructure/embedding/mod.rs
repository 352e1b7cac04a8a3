//! Embedding provider implementations

mod factory;
mod hashing;
mod http_client;
mod openai;

pub use factory::{EmbeddingConfig, EmbeddingProviderFactory, EmbeddingProviderType};
pub use hashing::{HashingEmbeddingProvider, DEFAULT_HASHING_MODEL};
pub use http_client::{HttpClient, HttpClientTrait};
pub use openai::{OpenAiEmbeddingProvider, DEFAULT_OPENAI_BASE_URL};

#[cfg(test)]
pub use http_client::mock::MockHttpClient;
