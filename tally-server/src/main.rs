//! # Tally Server
//!
//! Stremio addon that answers every stream query with a fixed placeholder
//! and records the demand behind it.
//!
//! ## Architecture
//!
//! The server is built on Axum and uses:
//! - A single JSON ledger document for persisted demand records
//! - Cinemeta for episode validation and metadata enrichment
//! - A background tracking task per stream request, decoupled from the
//!   HTTP response

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::Parser;
use tally_core::{CinemetaProvider, LedgerStore, RequestTracker};
use tally_server::{AppState, Config, create_app};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "tally-server")]
#[command(about = "Stremio addon that records stream demand per title and episode")]
struct Cli {
    /// Server port (overrides config)
    #[arg(short, long, env = "TALLY_PORT")]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long, env = "TALLY_HOST")]
    host: Option<String>,

    /// Ledger document path (overrides config)
    #[arg(long, env = "TALLY_LEDGER_PATH")]
    ledger: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = Config::from_env();
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(ledger) = cli.ledger {
        config.ledger_path = ledger;
    }

    info!(
        ledger = %config.ledger_path.display(),
        metadata = %config.cinemeta_url,
        "configuration loaded"
    );

    let provider = Arc::new(CinemetaProvider::new(config.cinemeta_url.clone()));
    let store = LedgerStore::new(config.ledger_path.clone());
    let tracker = Arc::new(RequestTracker::new(provider, store));

    let config = Arc::new(config);
    let state = AppState::new(tracker, Arc::clone(&config));
    let app = create_app(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("invalid host/port combination")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("Tally addon active on port {}", config.port);
    info!("http://127.0.0.1:{}/manifest.json", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}
