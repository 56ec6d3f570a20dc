//! # Admin Routes
//!
//! Store reset for demo environments. Accepts both GET and POST so it can
//! be triggered from a browser address bar as well as scripts. Guarded by
//! the admin token when one is configured.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use opcn_store::StoreCounts;

use crate::auth::require_admin;
use crate::error::AppError;
use crate::state::AppState;

/// Build the admin router.
pub fn router() -> Router<AppState> {
    Router::new().route("/admin/reset", get(reset_get).post(reset_post))
}

/// Result of a reset: how many records each collection held.
#[derive(Debug, Serialize, ToSchema)]
pub struct ResetResponse {
    pub ok: bool,
    #[schema(value_type = Object)]
    pub cleared: StoreCounts,
}

fn do_reset(state: &AppState, headers: &HeaderMap) -> Result<Json<ResetResponse>, AppError> {
    require_admin(headers, state.config.admin_token.as_ref())?;
    let cleared = state.store.reset();
    state.schedule_persist();
    tracing::warn!(
        bindings = cleared.bindings,
        credentials = cleared.credentials,
        capsules = cleared.capsules,
        "onchain store reset"
    );
    Ok(Json(ResetResponse { ok: true, cleared }))
}

/// GET /admin/reset — Empty all onchain collections.
#[utoipa::path(
    get,
    path = "/admin/reset",
    responses(
        (status = 200, description = "Collections emptied", body = ResetResponse),
        (status = 401, description = "Missing or invalid admin token", body = crate::error::ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn reset_get(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ResetResponse>, AppError> {
    do_reset(&state, &headers)
}

/// POST /admin/reset — Empty all onchain collections.
#[utoipa::path(
    post,
    path = "/admin/reset",
    responses(
        (status = 200, description = "Collections emptied", body = ResetResponse),
        (status = 401, description = "Missing or invalid admin token", body = crate::error::ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn reset_post(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ResetResponse>, AppError> {
    do_reset(&state, &headers)
}
