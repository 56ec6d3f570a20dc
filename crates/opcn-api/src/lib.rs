//! # opcn-api — HTTP Surface of the OPCN Onchain Layer
//!
//! Axum services for the simulated onchain layer of the OPCN agent
//! marketplace: wallet bindings, mock credential minting, and proof
//! capsule publishing/verification.
//!
//! ## API Surface
//!
//! | Route                          | Module                | Purpose |
//! |--------------------------------|-----------------------|---------|
//! | `POST /onchain/bind`           | [`routes::onchain`]   | Record a wallet binding |
//! | `GET /onchain/bindings`        | [`routes::onchain`]   | Bindings by address |
//! | `GET /onchain/bindings/by-agent` | [`routes::onchain`] | Binding by agent slug |
//! | `GET/POST /onchain/mint-credential` | [`routes::onchain`] | Credential lookup / mint |
//! | `POST /capsules`               | [`routes::capsules`]  | Publish a proof capsule |
//! | `GET /capsules`                | [`routes::capsules`]  | Capsules by agent slug |
//! | `GET /capsules/{id}`           | [`routes::capsules`]  | Single capsule |
//! | `POST /capsules/verify`        | [`routes::capsules`]  | Live re-verification |
//! | `GET/POST /admin/reset`        | [`routes::admin`]     | Empty the store |
//! | `GET /openapi.json`            | [`openapi`]           | OpenAPI spec |
//! | `GET /health/*`, `GET /metrics` | here                 | Probes and scrape |
//!
//! Health probes and `/metrics` sit outside the API router so they stay
//! reachable no matter what the domain routes are doing.

pub mod auth;
pub mod db;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::response::IntoResponse;
use axum::{Extension, Router};
use tower_http::trace::TraceLayer;

use crate::middleware::metrics::ApiMetrics;
use crate::state::AppState;

/// Check if metrics are enabled via the `OPCN_METRICS_ENABLED` env var.
/// Defaults to `true` when the variable is absent or set to anything other than `"false"`.
fn metrics_enabled() -> bool {
    std::env::var("OPCN_METRICS_ENABLED")
        .map(|v| v.to_lowercase() != "false")
        .unwrap_or(true)
}

/// Assemble the full application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let metrics = ApiMetrics::new();
    let metrics_on = metrics_enabled();

    // Body size limit: 1 MiB. Capsule results are short strings; anything
    // larger is a client bug.
    let mut api = Router::new()
        .merge(routes::onchain::router())
        .merge(routes::capsules::router())
        .merge(routes::admin::router())
        .merge(openapi::router())
        .layer(DefaultBodyLimit::max(1024 * 1024));

    // Only register the metrics middleware when metrics are enabled.
    if metrics_on {
        api = api
            .layer(from_fn(middleware::metrics::metrics_middleware))
            .layer(Extension(metrics.clone()));
    }

    let api = api
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    // Health probes and the metrics scrape stay outside the API router.
    let mut unauthenticated = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    if metrics_on {
        unauthenticated = unauthenticated
            .route("/metrics", axum::routing::get(prometheus_metrics))
            .layer(Extension(metrics));
    }

    let unauthenticated = unauthenticated.with_state(state);

    Router::new().merge(unauthenticated).merge(api)
}

/// GET /metrics — Prometheus metrics scrape endpoint.
///
/// Updates domain gauges from the store on each scrape (pull model), then
/// gathers and encodes all metrics in Prometheus text exposition format.
async fn prometheus_metrics(
    State(state): State<AppState>,
    Extension(metrics): Extension<ApiMetrics>,
) -> impl IntoResponse {
    let counts = state.store.counts();
    metrics.bindings_total().set(counts.bindings as f64);
    metrics.credentials_total().set(counts.credentials as f64);

    let capsules = state.store.capsule_status_counts();
    let gauge = metrics.capsules_total();
    gauge.reset();
    gauge
        .with_label_values(&["unverified"])
        .set(capsules.unverified as f64);
    gauge.with_label_values(&["ok"]).set(capsules.ok as f64);
    gauge
        .with_label_values(&["failed"])
        .set(capsules.failed as f64);

    match metrics.gather_and_encode() {
        Ok(body) => (
            StatusCode::OK,
            [(
                axum::http::header::CONTENT_TYPE,
                "text/plain; version=0.0.4; charset=utf-8",
            )],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to encode Prometheus metrics: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e).into_response()
        }
    }
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — verifies the application is ready to serve traffic.
///
/// Checks the store lock is acquirable and, when configured, that the
/// database answers. Returns 200 "ready" or 503 with a diagnostic message.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    // Store read lock acquirable.
    let _ = state.store.counts();

    // Database reachable (when configured).
    if let Some(pool) = &state.db {
        if let Err(e) = sqlx::query("SELECT 1").execute(pool).await {
            tracing::warn!(error = %e, "readiness: database unreachable");
            return (StatusCode::SERVICE_UNAVAILABLE, "database unreachable").into_response();
        }
    }

    (StatusCode::OK, "ready").into_response()
}
