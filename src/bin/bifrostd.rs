//! bifrostd — bifrost daemon.
//!
//! Serves the WebSocket bridge and the minimal health endpoint until
//! interrupted.

use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use bifrost::{Bridge, Config, ServiceRouter, health};

/// Bifrost daemon — WebSocket bridge to local LLM backends.
#[derive(Parser)]
#[command(name = "bifrostd")]
#[command(version)]
#[command(about = "Bifrost LLM bridge daemon")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Answer every request with deterministic mock output (no backend).
    #[arg(long)]
    mock: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let mut config = Config::load(args.config.as_deref())?;
    if args.mock {
        config.mock = true;
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        model = %config.backend.default_model,
        mock = config.mock,
        "bifrostd starting"
    );

    let router = Arc::new(ServiceRouter::new(&config));
    let bridge = Bridge::bind(&config, router).await?;
    let handle = bridge.handle();

    let health_address = config.server.health_address.clone();
    tokio::spawn(async move {
        if let Err(e) = health::serve(&health_address).await {
            error!(error = %e, "health endpoint failed");
        }
    });

    let bridge_task = tokio::spawn(bridge.run());

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    handle.shutdown();
    bridge_task.await??;

    info!("shutdown complete");
    Ok(())
}
