//! intelayer - exchange action signer - Entry Point

use std::path::Path;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use intelayer_cli::{AppConfig, Cli, Runner};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Config decides the log format, so it loads before logging starts
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(network) = cli.network {
        config.network = network;
    }

    intelayer_telemetry::init_logging(config.log_format)?;

    info!("Starting intelayer v{}", env!("CARGO_PKG_VERSION"));

    let (config_path, explicit) = AppConfig::resolve_path(cli.config.as_deref());
    if !explicit && !Path::new(&config_path).exists() {
        warn!(path = %config_path, "Config file not found, using defaults");
    } else {
        info!(path = %config_path, network = %config.network, "Configuration loaded");
    }

    let runner = Runner::new(config)?;
    runner.run(cli.command).await?;

    Ok(())
}
