//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::state::AppState;

/// Adds the admin bearer token security scheme to the OpenAPI spec.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .description(Some(
                            "Admin token for /admin/reset. Set via OPCN_ADMIN_TOKEN env var.",
                        ))
                        .build(),
                ),
            );
        }
    }
}

/// Assembled OpenAPI spec for the onchain layer API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "OPCN Onchain Layer API",
        version = "0.1.0",
        description = "Simulated onchain identity and proof layer for the OPCN agent marketplace.\n\nProvides:\n- **Wallet bindings**: associate a wallet address with an agent listing via a signed claim hash, upserted per (agentSlug, address)\n- **Mock credentials**: idempotent per-address identity token minting\n- **Proof capsules**: publish offer/delivery/identity proofs and re-verify them live against the agent's current claim hash\n\nNothing here touches a real blockchain: addresses, signatures, transaction hashes, and credentials are simulated end to end.\n\nOnly `/admin/reset` is authenticated (Bearer token, when configured).",
        license(name = "MIT"),
    ),
    servers(
        (url = "http://localhost:8787", description = "Local development server"),
    ),
    paths(
        // ── Onchain identity ─────────────────────────────────────────────
        crate::routes::onchain::bind,
        crate::routes::onchain::list_bindings,
        crate::routes::onchain::binding_by_agent,
        crate::routes::onchain::get_credential,
        crate::routes::onchain::mint_credential,
        // ── Proof capsules ───────────────────────────────────────────────
        crate::routes::capsules::create_capsule,
        crate::routes::capsules::list_capsules,
        crate::routes::capsules::get_capsule,
        crate::routes::capsules::verify_capsule,
        // ── Admin ────────────────────────────────────────────────────────
        crate::routes::admin::reset_get,
        crate::routes::admin::reset_post,
    ),
    components(
        schemas(
            // ── Error types ─────────────────────────────────────────────
            crate::error::ErrorBody,
            crate::error::ErrorDetail,
            // ── Onchain DTOs ────────────────────────────────────────────
            crate::routes::onchain::BindRequest,
            crate::routes::onchain::BindingEnvelope,
            crate::routes::onchain::BindingsEnvelope,
            crate::routes::onchain::AgentBindingEnvelope,
            crate::routes::onchain::MintRequest,
            crate::routes::onchain::MintResponse,
            crate::routes::onchain::CredentialEnvelope,
            // ── Capsule DTOs ────────────────────────────────────────────
            crate::routes::capsules::CreateCapsuleRequest,
            crate::routes::capsules::VerifyRequest,
            crate::routes::capsules::CapsuleEnvelope,
            crate::routes::capsules::CapsulesEnvelope,
            crate::routes::capsules::VerifyResponse,
            // ── Admin DTOs ──────────────────────────────────────────────
            crate::routes::admin::ResetResponse,
        ),
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "onchain", description = "Wallet bindings and mock credential minting"),
        (name = "capsules", description = "Proof capsule publishing, listing, and live verification"),
        (name = "admin", description = "Demo store administration"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router, serving the spec at `/openapi.json`.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json — Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
