//! Embed command - resolves queries through the cache tiers

use clap::Args;
use serde::Serialize;

use super::{print_json, Runtime};
use crate::domain::CacheTier;

#[derive(Args, Debug)]
pub struct EmbedArgs {
    /// Queries to embed, in order
    #[arg(required = true)]
    pub queries: Vec<String>,

    /// Include the full vector in the output
    #[arg(long)]
    pub full: bool,
}

#[derive(Debug, Serialize)]
struct EmbedOutput<'a> {
    query: &'a str,
    tier: CacheTier,
    dimensions: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    vector: Option<Vec<f32>>,
}

pub async fn run(args: EmbedArgs, runtime: &Runtime) -> anyhow::Result<()> {
    for query in &args.queries {
        let lookup = runtime.cache.lookup(query).await?;

        print_json(&EmbedOutput {
            query,
            tier: lookup.tier,
            dimensions: lookup.vector.len(),
            vector: args.full.then_some(lookup.vector),
        })?;
    }

    Ok(())
}
