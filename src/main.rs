use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use corsair_uci::UciEngine;

fn main() -> Result<()> {
    // stdout carries the protocol; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    info!("corsair starting");
    UciEngine::new().run().context("UCI loop failed")?;
    Ok(())
}
