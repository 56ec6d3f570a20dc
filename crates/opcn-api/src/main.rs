//! # opcn-api — Binary Entry Point
//!
//! Starts the Axum HTTP server for the OPCN onchain layer.
//! Binds to a configurable port (default 8787).

use anyhow::Context;

use opcn_api::state::{AppConfig, AppState};
use opcn_store::OnchainStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env();
    if config.admin_token.is_none() {
        tracing::warn!("OPCN_ADMIN_TOKEN is not set; /admin/reset is unauthenticated");
    }

    // Database pool is optional. Absent means in-memory only.
    let db = opcn_api::db::init_pool()
        .await
        .context("database initialization failed")?;

    // Hydrate the store from the last persisted snapshot, if any.
    let store = match &db {
        Some(pool) => match opcn_api::db::snapshot::load(pool).await? {
            Some(snapshot) => {
                let store = OnchainStore::from_snapshot(snapshot);
                let counts = store.counts();
                tracing::info!(
                    bindings = counts.bindings,
                    credentials = counts.credentials,
                    capsules = counts.capsules,
                    "restored onchain snapshot from database"
                );
                store
            }
            None => OnchainStore::new(),
        },
        None => OnchainStore::new(),
    };

    let port = config.port;
    let state = AppState::new(config, store, db);
    let app = opcn_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("OPCN onchain API listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
