//! Clear command - drops every cached embedding

use clap::Args;
use serde_json::json;

use super::{print_json, Runtime};

#[derive(Args, Debug)]
pub struct ClearArgs {
    /// Confirm the deletion
    #[arg(long)]
    pub yes: bool,
}

pub async fn run(args: ClearArgs, runtime: &Runtime) -> anyhow::Result<()> {
    if !args.yes {
        anyhow::bail!("Refusing to clear the cache without --yes");
    }

    let deleted = runtime.cache.clear_cache().await;
    print_json(&json!({ "store_keys_deleted": deleted }))
}
