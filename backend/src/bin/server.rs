//! SpaceX Agent HTTP Server Binary
//!
//! Main entry point for the paid SpaceX data agent. It loads configuration,
//! opens the transaction ledger, builds the entrypoint registry and starts
//! serving requests.
//!
//! # Usage
//!
//! ```bash
//! # Local development: every charge settles, memory-only ledger
//! PAYMENTS_MODE=open cargo run --bin spacex-agent-server
//!
//! # Persist the ledger across restarts
//! LEDGER_JOURNAL=./ledger.jsonl cargo run --bin spacex-agent-server
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `SPACEX_API_URL`: Upstream base URL (default: https://api.spacexdata.com/v4)
//! - `PAYMENTS_MODE`: `open` or `proof` (default: proof)
//! - `LEDGER_JOURNAL`: Journal file for the ledger (default: memory only)
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use spacex_agent::config::{AgentConfig, PaymentMode};
use spacex_agent::entrypoints::build_registry;
use spacex_agent::http::{create_router, AppState};
use spacex_agent::ledger::Ledger;
use spacex_agent::payments::gateway_for;
use spacex_agent::upstream::HttpFetcher;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting SpaceX agent");

    let config = AgentConfig::from_default_location()
        .and_then(AgentConfig::apply_env)
        .context("Failed to load configuration")?;

    let ledger = match &config.ledger.journal_path {
        Some(path) => Ledger::open(path)
            .with_context(|| format!("Failed to open ledger journal {}", path.display()))?,
        None => {
            info!("No ledger journal configured; transactions are kept in memory only");
            Ledger::new()
        }
    };

    if config.payments.mode == PaymentMode::Open {
        warn!("Payments mode is 'open': every charge settles without proof");
    }

    let upstream = HttpFetcher::from_config(&config.upstream)
        .context("Failed to build upstream HTTP client")?;
    info!(base_url = %upstream.base_url(), "Upstream configured");

    let registry = build_registry(
        &config,
        Arc::new(upstream),
        gateway_for(config.payments.mode),
        ledger,
    )?;

    let app = create_router(AppState::new(registry));

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid bind address")?;

    info!("Server listening on http://{}", addr);
    info!("Agent manifest: http://{}/.well-known/agent.json", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
