//! Swap aggregator gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────────┐
//!                      │                     GATEWAY                          │
//!   Client Request     │  ┌──────────┐   ┌───────────┐   ┌──────────────┐     │
//!   ───────────────────┼─▶│ ingress  │──▶│ validator │──▶│  aggregator  │─────┼──▶ Upstream
//!                      │  │ filter   │   │ (quoting) │   │   client     │     │    Aggregator
//!                      │  └──────────┘   └───────────┘   └──────┬───────┘     │
//!                      │   origin/CORS                          │             │
//!                      │   body limit                           ▼             │
//!   Client Response    │   rate limit                    ┌──────────────┐     │
//!   ◀──────────────────┼─────────────────────────────────│   shaper     │◀────┼───
//!                      │                                 └──────────────┘     │
//!                      │  config · observability · lifecycle                  │
//!                      └──────────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use swap_gateway::config::load_config;
use swap_gateway::lifecycle::Shutdown;
use swap_gateway::observability::{logging, metrics};
use swap_gateway::HttpServer;

#[derive(Parser)]
#[command(name = "swap-gateway")]
#[command(about = "HTTP gateway for a token-swap aggregator", long_about = None)]
struct Cli {
    /// Optional TOML config file; environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listening port.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    logging::init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        service = %config.server.service_name,
        "swap-gateway starting"
    );
    tracing::info!(
        upstream = %config.upstream.base_url,
        timeout_ms = config.upstream.timeout_ms,
        allowed_origins = ?config.security.allowed_origins,
        rate_limit_max = config.rate_limit.max_requests,
        "Configuration loaded"
    );

    if let Some(addr) = &config.observability.metrics_address {
        match addr.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(metrics_address = %addr, error = %e, "Failed to parse metrics address"),
        }
    }

    let listener = TcpListener::bind(config.server.bind_address()).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    shutdown.trigger_on_signal();

    let server = HttpServer::new(config);
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
