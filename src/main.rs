//! stockvol - Main Entry Point
//!
//! Quality gate and feature engineering CLI for the volatility pipeline.

use clap::Parser;
use stockvol::cli::{run, Cli};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stockvol=info".into()),
        )
        .init();

    let cli = Cli::parse();
    run(cli)
}
