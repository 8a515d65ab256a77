//! Pitwall Server
//!
//! Loads the CSV data directory into the in-memory store and serves the
//! report API.

use anyhow::{Context, Result};
use pitwall_server::{api, config::ServerConfig, state::AppState};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting Pitwall Server");

    let config = ServerConfig::from_env()?;

    let (store, stats) = pitwall_store::load_dir(&config.data_dir)
        .with_context(|| format!("loading data from {}", config.data_dir.display()))?;
    info!(
        rows = stats.total_kept(),
        skipped = stats.total_skipped(),
        "loaded data from {}",
        config.data_dir.display()
    );

    let state = AppState::new(Arc::new(store));
    let app = api::create_router(state);

    info!("Server listening on http://{}", config.addr);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
