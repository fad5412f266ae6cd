//! Sonora CLI - Music Synthesis
//!
//! Command-line interface for the Sonora synthesis engine.

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sonora::cli::{commands, Cli};
use sonora::engine::{EngineConfig, SynthesisEngine};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose { "debug" } else { "info" })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    info!("Sonora v{}", env!("CARGO_PKG_VERSION"));

    let mut config = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => EngineConfig::default(),
    }
    .with_env_overrides();
    if let Some(storage) = cli.storage {
        config.storage_root = storage;
    }

    let engine = SynthesisEngine::from_config(&config).with_context(|| {
        format!("opening storage at {}", config.storage_root.display())
    })?;

    let output = commands::run(&engine, &cli.user, cli.command)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
