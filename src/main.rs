//! Ingress gateway binary.
//!
//! ```text
//! ingress-gateway [--config <path>]
//! ```
//!
//! Without `--config` the defaults are used: no routes, so every request
//! answers 400.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use ingress_gateway::config::loader::load_config;
use ingress_gateway::lifecycle::{wait_for_signal, Shutdown};
use ingress_gateway::observability::{logging, metrics};
use ingress_gateway::{GatewayConfig, HttpServer};

#[derive(Parser)]
#[command(name = "ingress-gateway")]
#[command(about = "HTTP ingress gateway with response caching", long_about = None)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "ingress-gateway starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        routes = config.routes.len(),
        cache_enabled = config.cache.enabled,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    tokio::spawn(async move {
        wait_for_signal().await;
        shutdown.trigger();
    });

    HttpServer::new(config).run(listener, receiver).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
