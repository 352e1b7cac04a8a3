//! Similar command - lists cached queries near a given query
//!
//! The local tier only lives for one process, so candidate queries given
//! on the command line or in `--file` are loaded before the search.

use std::path::PathBuf;

use clap::Args;

use super::preload::collect_queries;
use super::{print_json, Runtime};
use crate::domain::SimilarQuery;
use crate::infrastructure::services::{EmbeddingCacheService, DEFAULT_SIMILARITY_THRESHOLD};

#[derive(Args, Debug)]
pub struct SimilarArgs {
    /// Query to compare against the cache
    pub query: String,

    /// Candidate queries to load before searching
    pub candidates: Vec<String>,

    /// File with one candidate query per line; blank lines and `#` comments are skipped
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Minimum cosine similarity
    #[arg(long, default_value_t = DEFAULT_SIMILARITY_THRESHOLD, allow_negative_numbers = true)]
    pub threshold: f32,
}

pub async fn run(args: SimilarArgs, runtime: &Runtime) -> anyhow::Result<()> {
    let candidates = collect_queries(args.candidates, args.file.as_deref()).await?;
    let similar = similar_queries(&runtime.cache, &args.query, &candidates, args.threshold).await?;

    print_json(&similar)
}

async fn similar_queries(
    cache: &EmbeddingCacheService,
    query: &str,
    candidates: &[String],
    threshold: f32,
) -> anyhow::Result<Vec<SimilarQuery>> {
    if !candidates.is_empty() {
        cache.preload(candidates).await;
    }

    Ok(cache.find_similar(query, threshold).await?)
}
