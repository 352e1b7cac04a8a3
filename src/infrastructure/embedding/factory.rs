//! Embedding provider selection from configuration

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use super::hashing::HashingEmbeddingProvider;
use super::http_client::HttpClient;
use super::openai::{OpenAiEmbeddingProvider, DEFAULT_OPENAI_BASE_URL};
use crate::domain::embedding::EmbeddingProvider;
use crate::domain::DomainError;

/// Supported embedding providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingProviderType {
    /// OpenAI-compatible HTTP endpoint
    #[serde(alias = "open_ai")]
    OpenAi,
    /// Offline feature hashing
    #[default]
    Hashing,
    /// No provider; only cached vectors can be served
    Disabled,
}

impl std::fmt::Display for EmbeddingProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenAi => write!(f, "openai"),
            Self::Hashing => write!(f, "hashing"),
            Self::Disabled => write!(f, "disabled"),
        }
    }
}

impl std::str::FromStr for EmbeddingProviderType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" | "open_ai" => Ok(Self::OpenAi),
            "hashing" | "hash" => Ok(Self::Hashing),
            "disabled" | "none" | "off" => Ok(Self::Disabled),
            _ => Err(DomainError::configuration(format!(
                "Unknown embedding provider: {}. Valid providers: openai, hashing, disabled",
                s
            ))),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_OPENAI_BASE_URL.to_string()
}

fn default_model() -> String {
    "all-MiniLM-L6-v2".to_string()
}

fn default_dimensions() -> usize {
    384
}

fn default_timeout_secs() -> u64 {
    30
}

/// `embedding` section of the application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default)]
    pub provider: EmbeddingProviderType,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    /// Vector size for the hashing provider
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProviderType::default(),
            base_url: default_base_url(),
            api_key: None,
            model: default_model(),
            dimensions: default_dimensions(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl EmbeddingConfig {
    pub fn with_provider(mut self, provider: EmbeddingProviderType) -> Self {
        self.provider = provider;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = dimensions;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Factory for creating embedding providers
#[derive(Debug, Default)]
pub struct EmbeddingProviderFactory;

impl EmbeddingProviderFactory {
    /// Builds the configured provider, or `None` when embedding is disabled
    pub fn create(
        config: &EmbeddingConfig,
    ) -> Result<Option<Arc<dyn EmbeddingProvider>>, DomainError> {
        match config.provider {
            EmbeddingProviderType::OpenAi => {
                if config.model.trim().is_empty() {
                    return Err(DomainError::configuration(
                        "Embedding model must be set for the openai provider",
                    ));
                }

                let client = HttpClient::with_timeout(config.timeout())?;
                let provider =
                    OpenAiEmbeddingProvider::new(client, config.api_key.clone(), &config.model)
                        .with_base_url(&config.base_url);

                Ok(Some(Arc::new(provider)))
            }
            EmbeddingProviderType::Hashing => {
                let provider = HashingEmbeddingProvider::new(config.dimensions)?;
                Ok(Some(Arc::new(provider)))
            }
            EmbeddingProviderType::Disabled => Ok(None),
        }
    }
}
