use clap::Parser;
use property_embedding_cache::cli::{self, Cli, Command, Runtime};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let runtime = Runtime::start(cli.metrics).await?;

    match cli.command {
        Command::Embed(args) => cli::embed::run(args, &runtime).await?,
        Command::Preload(args) => cli::preload::run(args, &runtime).await?,
        Command::Similar(args) => cli::similar::run(args, &runtime).await?,
        Command::Clear(args) => cli::clear::run(args, &runtime).await?,
    }

    runtime.finish().await
}
