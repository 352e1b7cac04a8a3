//! Preload command - warms the cache with common queries

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;

use super::{print_json, Runtime};

#[derive(Args, Debug)]
pub struct PreloadArgs {
    /// File with one query per line; blank lines and `#` comments are skipped
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Queries to preload
    pub queries: Vec<String>,
}

pub async fn run(args: PreloadArgs, runtime: &Runtime) -> anyhow::Result<()> {
    let queries = collect_queries(args.queries, args.file.as_deref()).await?;

    if queries.is_empty() {
        anyhow::bail!("No queries to preload; pass queries or --file");
    }

    let summary = runtime.cache.preload(&queries).await;
    print_json(&summary)
}

/// Positional queries followed by those read from `file`, if any
pub(super) async fn collect_queries(
    mut queries: Vec<String>,
    file: Option<&Path>,
) -> anyhow::Result<Vec<String>> {
    if let Some(path) = file {
        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read queries from {}", path.display()))?;
        queries.extend(parse_query_lines(&contents));
    }

    Ok(queries)
}

fn parse_query_lines(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
