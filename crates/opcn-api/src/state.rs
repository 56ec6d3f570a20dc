//! # Application Configuration and State
//!
//! Env-based configuration and the shared state handed to every handler.
//! The store is in-memory; when a database pool is present, mutating
//! handlers schedule a snapshot write-back after each change.

use opcn_store::OnchainStore;
use sqlx::PgPool;

use crate::auth::SecretString;

/// Default listen port when `OPCN_PORT` is unset.
const DEFAULT_PORT: u16 = 8787;

/// Server configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// TCP port to listen on (`OPCN_PORT`).
    pub port: u16,
    /// Bearer token guarding `/admin/reset` (`OPCN_ADMIN_TOKEN`).
    /// `None` leaves the endpoint open.
    pub admin_token: Option<SecretString>,
}

impl AppConfig {
    /// Read configuration from environment variables.
    pub fn from_env() -> Self {
        let port = std::env::var("OPCN_PORT")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        let admin_token = std::env::var("OPCN_ADMIN_TOKEN")
            .ok()
            .filter(|token| !token.is_empty())
            .map(SecretString::new);
        Self { port, admin_token }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            admin_token: None,
        }
    }
}

/// Shared application state passed to all route handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: OnchainStore,
    /// Present when `DATABASE_URL` is set; `None` means in-memory only.
    pub db: Option<PgPool>,
}

impl AppState {
    pub fn new(config: AppConfig, store: OnchainStore, db: Option<PgPool>) -> Self {
        Self { config, store, db }
    }

    /// In-memory state with default configuration. Used by tests and by the
    /// server when no database is configured.
    pub fn in_memory(config: AppConfig) -> Self {
        Self::new(config, OnchainStore::new(), None)
    }

    /// Schedule an asynchronous snapshot write-back to the database.
    ///
    /// No-op without a pool. Persistence is best-effort: a failed write is
    /// logged, not surfaced to the request that triggered it.
    pub fn schedule_persist(&self) {
        let Some(pool) = self.db.clone() else {
            return;
        };
        let snapshot = self.store.snapshot();
        tokio::spawn(async move {
            if let Err(e) = crate::db::snapshot::save(&pool, &snapshot).await {
                tracing::error!(error = %e, "failed to persist onchain snapshot");
            }
        });
    }
}
