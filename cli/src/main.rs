//! flowProbe stream server
//!
//! Serves a synthetic order/payment event stream over Server-Sent Events.
//!
//! # Usage
//!
//! ```bash
//! # Built-in retail day on 0.0.0.0:8080
//! flowprobe
//!
//! # Custom phase table and tunables
//! flowprobe --config flowprobe.toml
//!
//! # Reproducible sessions on another port
//! flowprobe --listen 127.0.0.1:9000 --seed 42
//! ```
//!
//! Clients connect to `GET /stream`; see `SimulatorConfig` for every
//! configuration option.

mod server;

use anyhow::{Context, Result};
use clap::Parser;
use flowprobe_core_rs::SimulatorConfig;
use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// flowProbe SSE server
///
/// Streams a compressed retail day of order and payment events per connection.
#[derive(Parser, Debug)]
#[command(name = "flowprobe")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:8080")]
    listen: SocketAddr,

    /// Base RNG seed (overrides config); session n uses seed + n
    #[arg(long)]
    seed: Option<u64>,

    /// Log level filter (RUST_LOG takes precedence)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .init();

    let config = load_config(&cli)?;
    info!(
        phases = config.phases.len(),
        ceiling_secs = config.timing.ceiling_secs,
        seed = ?config.seed,
        "Configuration loaded"
    );

    let app = server::create_router(server::AppState::new(config));
    let listener = tokio::net::TcpListener::bind(cli.listen)
        .await
        .with_context(|| format!("failed to bind {}", cli.listen))?;

    info!(addr = %cli.listen, "Starting flowProbe SSE server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

/// Load, override and validate configuration. Any error here is fatal.
fn load_config(cli: &Cli) -> Result<SimulatorConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            SimulatorConfig::from_toml_str(&text)
                .with_context(|| format!("invalid configuration in {}", path.display()))?
        }
        None => SimulatorConfig::default(),
    };

    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
