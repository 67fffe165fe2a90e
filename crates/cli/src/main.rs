//! poetredis CLI entry point.

use anyhow::Result;
use clap::Parser;
use poetredis_cli::cli::Cli;
use poetredis_cli::commands;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so command output stays pipeable.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "poetredis=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let output = commands::run(&cli).await?;
    if !output.is_empty() {
        println!("{output}");
    }

    Ok(())
}
