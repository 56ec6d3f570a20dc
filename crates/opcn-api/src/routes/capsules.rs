//! # Proof Capsule Routes
//!
//! Publishing, listing, and verifying proof capsules.
//!
//! Verification is live: each verify call recomputes the digest from the
//! agent binding's claim hash at that moment, so a capsule that failed
//! against a stale binding passes once the binding is corrected. Unknown
//! capsule ids and unbound agents report in-band (`ok: false` with a
//! `reason`) rather than as HTTP errors — the verify endpoint's contract is
//! "here is the verification result", and both are results.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use opcn_core::{Capsule, CapsuleDraft, CapsuleType, WalletAddress};
use opcn_store::VerifyOutcome;

use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::AppState;

/// Build the capsule router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/capsules", post(create_capsule).get(list_capsules))
        .route("/capsules/verify", post(verify_capsule))
        .route("/capsules/:id", get(get_capsule))
}

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

/// Request to publish a proof capsule.
///
/// `proofHash` and `createdAt` are required: the digest must be generated
/// over the final `(result, claimHash, createdAt)` before publishing, and
/// the stored timestamp must be the one that went into the digest.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCapsuleRequest {
    #[serde(default)]
    pub agent_slug: String,
    #[serde(default)]
    pub owner_address: String,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub capsule_type: Option<CapsuleType>,
    #[serde(default)]
    pub result: String,
    #[serde(default)]
    pub proof_hash: String,
    #[serde(default)]
    pub created_at: String,
}

/// Request to verify a capsule against its agent's current binding.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub agent_slug: String,
}

/// Response wrapper: a single capsule.
#[derive(Debug, Serialize, ToSchema)]
pub struct CapsuleEnvelope {
    #[schema(value_type = Object)]
    pub capsule: Capsule,
}

/// Response wrapper: capsules for an agent slug.
#[derive(Debug, Serialize, ToSchema)]
pub struct CapsulesEnvelope {
    #[schema(value_type = Vec<Object>)]
    pub capsules: Vec<Capsule>,
}

/// Verification result. Always HTTP 200 once the request parses; failure
/// modes are carried in `ok`/`reason`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub ok: bool,
    /// `not_found` or `binding_missing`, present only when nothing was checked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// The capsule with its updated verify status, when a check ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub capsule: Option<Capsule>,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

impl Validate for CreateCapsuleRequest {
    fn validate(&self) -> Result<(), String> {
        if self.agent_slug.trim().is_empty() {
            return Err("agentSlug is required".into());
        }
        if self.owner_address.trim().is_empty() {
            return Err("ownerAddress is required".into());
        }
        if self.capsule_type.is_none() {
            return Err("capsuleType is required".into());
        }
        if self.result.trim().is_empty() {
            return Err("result is required".into());
        }
        if self.proof_hash.trim().is_empty() {
            return Err("proofHash is required".into());
        }
        if self.created_at.trim().is_empty() {
            return Err("createdAt is required".into());
        }
        Ok(())
    }
}

impl Validate for VerifyRequest {
    fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("id is required".into());
        }
        if self.agent_slug.trim().is_empty() {
            return Err("agentSlug is required".into());
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /capsules — Publish a proof capsule.
///
/// Assigns the record id and a mock transaction hash; the capsule starts
/// `unverified`.
#[utoipa::path(
    post,
    path = "/capsules",
    request_body = CreateCapsuleRequest,
    responses(
        (status = 200, description = "Capsule stored", body = CapsuleEnvelope),
        (status = 400, description = "Missing required fields", body = crate::error::ErrorBody),
    ),
    tag = "capsules"
)]
pub async fn create_capsule(
    State(state): State<AppState>,
    body: Result<Json<CreateCapsuleRequest>, JsonRejection>,
) -> Result<Json<CapsuleEnvelope>, AppError> {
    let req = extract_validated_json(body)?;
    // Validation guarantees the type is present.
    let capsule_type = req
        .capsule_type
        .ok_or_else(|| AppError::Validation("capsuleType is required".into()))?;

    let capsule = state.store.create_capsule(CapsuleDraft {
        agent_slug: req.agent_slug,
        owner_address: WalletAddress::new(req.owner_address),
        capsule_type,
        result: req.result,
        proof_hash: req.proof_hash,
        created_at: req.created_at,
    });
    state.schedule_persist();

    tracing::info!(id = %capsule.id, capsule_type = %capsule.capsule_type, "proof capsule published");
    Ok(Json(CapsuleEnvelope { capsule }))
}

/// GET /capsules?slug= — Capsules published against an agent listing.
///
/// An absent or empty `slug` yields an empty list.
#[utoipa::path(
    get,
    path = "/capsules",
    params(("slug" = Option<String>, Query, description = "Agent slug")),
    responses(
        (status = 200, description = "Capsules for the agent, newest first", body = CapsulesEnvelope),
    ),
    tag = "capsules"
)]
pub async fn list_capsules(
    State(state): State<AppState>,
    Query(query): Query<CapsulesQuery>,
) -> Json<CapsulesEnvelope> {
    let capsules = match query.slug.as_deref() {
        Some(slug) if !slug.is_empty() => state.store.capsules_by_slug(slug),
        _ => Vec::new(),
    };
    Json(CapsulesEnvelope { capsules })
}

/// Query for capsule listings.
#[derive(Debug, Deserialize)]
pub struct CapsulesQuery {
    #[serde(default)]
    pub slug: Option<String>,
}

/// GET /capsules/{id} — Fetch a single capsule.
#[utoipa::path(
    get,
    path = "/capsules/{id}",
    params(("id" = String, Path, description = "Capsule record id")),
    responses(
        (status = 200, description = "The capsule", body = CapsuleEnvelope),
        (status = 404, description = "No capsule with this id", body = crate::error::ErrorBody),
    ),
    tag = "capsules"
)]
pub async fn get_capsule(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CapsuleEnvelope>, AppError> {
    let capsule = state
        .store
        .capsule(&id)
        .ok_or_else(|| AppError::NotFound(format!("capsule {id}")))?;
    Ok(Json(CapsuleEnvelope { capsule }))
}

/// POST /capsules/verify — Re-verify a capsule against the agent's binding.
///
/// Recomputes `sha256(result | claimHash | createdAt)` with the binding's
/// current claim hash and compares it to the stored proof hash,
/// case-insensitively. Updates the capsule's verify status to `ok` or
/// `failed`. Unknown ids and unbound agents come back in-band with HTTP 200.
#[utoipa::path(
    post,
    path = "/capsules/verify",
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Verification result", body = VerifyResponse),
        (status = 400, description = "Missing required fields", body = crate::error::ErrorBody),
    ),
    tag = "capsules"
)]
pub async fn verify_capsule(
    State(state): State<AppState>,
    body: Result<Json<VerifyRequest>, JsonRejection>,
) -> Result<Json<VerifyResponse>, AppError> {
    let req = extract_validated_json(body)?;

    let response = match state.store.verify_capsule(&req.id, &req.agent_slug) {
        VerifyOutcome::NotFound => VerifyResponse {
            ok: false,
            reason: Some("not_found".into()),
            capsule: None,
        },
        VerifyOutcome::BindingMissing => VerifyResponse {
            ok: false,
            reason: Some("binding_missing".into()),
            capsule: None,
        },
        VerifyOutcome::Checked { ok, capsule } => {
            state.schedule_persist();
            tracing::info!(id = %capsule.id, ok, "capsule verification ran");
            VerifyResponse {
                ok,
                reason: None,
                capsule: Some(capsule),
            }
        }
    };

    Ok(Json(response))
}
