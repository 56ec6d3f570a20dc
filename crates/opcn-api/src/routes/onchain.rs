//! # Onchain Identity Routes
//!
//! Wallet-to-agent bindings and mock credential minting.
//!
//! The bind endpoint derives the binding status server-side: it recomposes
//! the bind message from the submitted fields and verifies the signature
//! against the claimed address. Verification success records `verified`;
//! any verification failure records `bound` instead of erroring, so a
//! binding is never lost to a bad signature. Only missing fields reject.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use opcn_core::{now_iso, Binding, BindingDraft, BindingStatus, Credential, WalletAddress};
use opcn_crypto::{bind_message, verify_bind_signature};

use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::AppState;

/// Chain id recorded when the wallet does not report one (Sepolia).
const DEFAULT_CHAIN_ID: u64 = 11_155_111;

/// Build the onchain identity router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/onchain/bind", post(bind))
        .route("/onchain/bindings", get(list_bindings))
        .route("/onchain/bindings/by-agent", get(binding_by_agent))
        .route(
            "/onchain/mint-credential",
            get(get_credential).post(mint_credential),
        )
}

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

/// Request to record a wallet binding. Everything a binding holds except
/// the store-assigned id.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BindRequest {
    /// Wallet address claiming the binding.
    #[serde(default)]
    pub address: String,
    /// Chain id reported by the wallet. Defaults when absent.
    #[serde(default)]
    pub chain_id: Option<u64>,
    /// Agent listing being bound.
    #[serde(default)]
    pub agent_slug: String,
    /// Claim hash the wallet signed (`0x` + 64 hex).
    #[serde(default)]
    pub claim_hash: String,
    /// Hex signature over the bind message.
    #[serde(default)]
    pub signature: String,
    /// Signing timestamp. Defaults to now when absent, at the cost of the
    /// signature then failing verification (status `bound`).
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Response wrapper: a single binding.
#[derive(Debug, Serialize, ToSchema)]
pub struct BindingEnvelope {
    #[schema(value_type = Object)]
    pub binding: Binding,
}

/// Response wrapper: bindings held by an address.
#[derive(Debug, Serialize, ToSchema)]
pub struct BindingsEnvelope {
    #[schema(value_type = Vec<Object>)]
    pub bindings: Vec<Binding>,
}

/// Response wrapper: the binding for an agent slug, or null.
#[derive(Debug, Serialize, ToSchema)]
pub struct AgentBindingEnvelope {
    #[schema(value_type = Option<Object>)]
    pub binding: Option<Binding>,
}

/// Query for binding lookups by address.
#[derive(Debug, Deserialize)]
pub struct AddressQuery {
    #[serde(default)]
    pub address: Option<String>,
}

/// Query for binding lookups by agent slug.
#[derive(Debug, Deserialize)]
pub struct SlugQuery {
    #[serde(default)]
    pub slug: Option<String>,
}

/// Request to mint a credential for an address.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MintRequest {
    #[serde(default)]
    pub address: String,
}

/// Response to a mint: the token id alongside the full record.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MintResponse {
    pub token_id: String,
    #[schema(value_type = Object)]
    pub credential: Credential,
}

/// Response wrapper: the credential for an address, or null.
#[derive(Debug, Serialize, ToSchema)]
pub struct CredentialEnvelope {
    #[schema(value_type = Option<Object>)]
    pub credential: Option<Credential>,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

impl Validate for BindRequest {
    fn validate(&self) -> Result<(), String> {
        if self.address.trim().is_empty() {
            return Err("address is required".into());
        }
        if self.agent_slug.trim().is_empty() {
            return Err("agentSlug is required".into());
        }
        if self.claim_hash.trim().is_empty() {
            return Err("claimHash is required".into());
        }
        if self.signature.trim().is_empty() {
            return Err("signature is required".into());
        }
        Ok(())
    }
}

impl Validate for MintRequest {
    fn validate(&self) -> Result<(), String> {
        if self.address.trim().is_empty() {
            return Err("address is required".into());
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /onchain/bind — Record a wallet binding for an agent listing.
///
/// Upserts on `(agentSlug, address)` with the address compared lower-cased;
/// re-binding the same pair overwrites the record but keeps its id. Status
/// is derived here from signature verification and fails open to `bound`.
#[utoipa::path(
    post,
    path = "/onchain/bind",
    request_body = BindRequest,
    responses(
        (status = 200, description = "Binding recorded", body = BindingEnvelope),
        (status = 400, description = "Missing required fields", body = crate::error::ErrorBody),
    ),
    tag = "onchain"
)]
pub async fn bind(
    State(state): State<AppState>,
    body: Result<Json<BindRequest>, JsonRejection>,
) -> Result<Json<BindingEnvelope>, AppError> {
    let req = extract_validated_json(body)?;
    let created_at = req.created_at.unwrap_or_else(now_iso);
    let address = WalletAddress::new(req.address);

    let message = bind_message(&req.agent_slug, &req.claim_hash, &created_at);
    let status = match verify_bind_signature(&req.signature, &message, &address) {
        Ok(()) => BindingStatus::Verified,
        Err(e) => {
            tracing::debug!(
                agent_slug = %req.agent_slug,
                error = %e,
                "bind signature did not verify, recording as bound"
            );
            BindingStatus::Bound
        }
    };

    let binding = state.store.upsert_binding(BindingDraft {
        address,
        chain_id: req.chain_id.unwrap_or(DEFAULT_CHAIN_ID),
        agent_slug: req.agent_slug,
        claim_hash: req.claim_hash,
        signature: req.signature,
        created_at,
        status,
    });
    state.schedule_persist();

    tracing::info!(id = %binding.id, status = %binding.status, "wallet binding recorded");
    Ok(Json(BindingEnvelope { binding }))
}

/// GET /onchain/bindings?address= — Bindings held by a wallet address.
///
/// An absent or empty `address` yields an empty list, not an error.
#[utoipa::path(
    get,
    path = "/onchain/bindings",
    params(("address" = Option<String>, Query, description = "Wallet address, matched case-insensitively")),
    responses(
        (status = 200, description = "Bindings for the address", body = BindingsEnvelope),
    ),
    tag = "onchain"
)]
pub async fn list_bindings(
    State(state): State<AppState>,
    Query(query): Query<AddressQuery>,
) -> Json<BindingsEnvelope> {
    let bindings = match query.address.as_deref() {
        Some(address) if !address.is_empty() => state.store.bindings_by_address(address),
        _ => Vec::new(),
    };
    Json(BindingsEnvelope { bindings })
}

/// GET /onchain/bindings/by-agent?slug= — The binding for an agent listing.
///
/// Returns the first binding recorded for the slug regardless of requester;
/// `null` when the slug is absent or unbound.
#[utoipa::path(
    get,
    path = "/onchain/bindings/by-agent",
    params(("slug" = Option<String>, Query, description = "Agent slug")),
    responses(
        (status = 200, description = "Binding for the agent, or null", body = AgentBindingEnvelope),
    ),
    tag = "onchain"
)]
pub async fn binding_by_agent(
    State(state): State<AppState>,
    Query(query): Query<SlugQuery>,
) -> Json<AgentBindingEnvelope> {
    let binding = query
        .slug
        .as_deref()
        .filter(|slug| !slug.is_empty())
        .and_then(|slug| state.store.binding_by_agent(slug));
    Json(AgentBindingEnvelope { binding })
}

/// GET /onchain/mint-credential?address= — Look up a minted credential.
#[utoipa::path(
    get,
    path = "/onchain/mint-credential",
    params(("address" = Option<String>, Query, description = "Wallet address, matched case-insensitively")),
    responses(
        (status = 200, description = "Credential for the address, or null", body = CredentialEnvelope),
    ),
    tag = "onchain"
)]
pub async fn get_credential(
    State(state): State<AppState>,
    Query(query): Query<AddressQuery>,
) -> Json<CredentialEnvelope> {
    let credential = query
        .address
        .as_deref()
        .filter(|address| !address.is_empty())
        .and_then(|address| state.store.credential_by_address(address));
    Json(CredentialEnvelope { credential })
}

/// POST /onchain/mint-credential — Mint a mock identity credential.
///
/// Idempotent per address: a repeat mint returns the existing record with
/// its original token id.
#[utoipa::path(
    post,
    path = "/onchain/mint-credential",
    request_body = MintRequest,
    responses(
        (status = 200, description = "Credential minted or already held", body = MintResponse),
        (status = 400, description = "Missing address", body = crate::error::ErrorBody),
    ),
    tag = "onchain"
)]
pub async fn mint_credential(
    State(state): State<AppState>,
    body: Result<Json<MintRequest>, JsonRejection>,
) -> Result<Json<MintResponse>, AppError> {
    let req = extract_validated_json(body)?;
    let credential = state.store.mint_credential(WalletAddress::new(req.address));
    state.schedule_persist();

    tracing::info!(token_id = %credential.token_id, "credential mint served");
    Ok(Json(MintResponse {
        token_id: credential.token_id.clone(),
        credential,
    }))
}
