//! Fides demo node — entry point.
//!
//! Starts the agent wiring, signup policy, and connection responder
//! with configuration from a TOML file or defaults.

// Public APIs for node internals — used by tests and external consumers.
#![allow(dead_code)]

mod config;
mod node;

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use config::FidesConfig;
use node::FidesNode;

/// Fides demo node
#[derive(Parser, Debug)]
#[command(name = "fides-node", version, about = "Fides demo node")]
struct Args {
    /// Path to the configuration file (TOML).
    #[arg(short, long, default_value = "fides.toml")]
    config: PathBuf,

    /// Override the responder poll interval in milliseconds.
    #[arg(long)]
    poll_interval_ms: Option<u64>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Run against an in-memory agent instead of the configured agency.
    #[arg(long)]
    dry_run: bool,

    /// Generate a default config file and exit.
    #[arg(long)]
    init: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    // Handle --init flag
    if args.init {
        let config = FidesConfig::default();
        config.save(&args.config)?;
        tracing::info!(path = %args.config.display(), "wrote default config");
        return Ok(());
    }

    // Load configuration
    let mut config = FidesConfig::load(&args.config)?;

    // Apply CLI overrides
    if let Some(interval) = args.poll_interval_ms {
        config.responder.poll_interval_ms = interval;
    }
    config.logging.level = args.log_level;

    tracing::info!("Fides node v{}", env!("CARGO_PKG_VERSION"));

    let node = FidesNode::new(config, args.dry_run)?;
    node.start().await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("received shutdown signal");

    node.shutdown().await?;
    tracing::info!("Fides node exited cleanly");
    Ok(())
}
