//! CLI module for the property embedding cache
//!
//! Subcommands run against one cache instance built from configuration:
//! - `embed`: resolve queries to vectors
//! - `preload`: warm the cache from arguments or a file
//! - `similar`: list cached queries close to a given query
//! - `clear`: drop every cached vector

pub mod clear;
pub mod embed;
pub mod preload;
pub mod similar;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::config::AppConfig;
use crate::infrastructure::logging::init_logging;
use crate::infrastructure::observability::{init_metrics, PrometheusMetrics};
use crate::infrastructure::services::EmbeddingCacheService;

/// Property Embedding Cache - multi-level cache for query embeddings
#[derive(Parser)]
#[command(name = "property-embedding-cache")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Print Prometheus metrics after the command finishes
    #[arg(long, global = true)]
    pub metrics: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Resolve queries to embeddings through the cache
    Embed(embed::EmbedArgs),

    /// Warm the cache with common queries
    Preload(preload::PreloadArgs),

    /// Find cached queries similar to a query
    Similar(similar::SimilarArgs),

    /// Remove every cached embedding and reset stats
    Clear(clear::ClearArgs),
}

/// Cache and metrics handle shared by every subcommand
pub struct Runtime {
    pub cache: Arc<EmbeddingCacheService>,
    metrics: Option<PrometheusMetrics>,
}

impl Runtime {
    /// Load configuration, then set up logging, metrics and the cache
    pub async fn start(with_metrics: bool) -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = AppConfig::load()?;
        init_logging(&config.logging)?;

        config.metrics.enabled |= with_metrics;
        let metrics = init_metrics(&config.metrics);

        let cache = crate::create_embedding_cache_with_config(&config).await?;

        Ok(Self { cache, metrics })
    }

    /// Print the stats report and, if enabled, the metrics exposition
    pub async fn finish(&self) -> anyhow::Result<()> {
        print_json(&self.cache.get_stats().await)?;

        if let Some(metrics) = &self.metrics {
            println!("{}", metrics.render());
        }

        Ok(())
    }
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
