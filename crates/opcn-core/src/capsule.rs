//! # Proof Capsules
//!
//! A capsule is a small proof record published against an agent listing:
//! the result payload, a client-computed proof hash over
//! `result|claim_hash|created_at`, and a mock transaction hash. The
//! verifier recomputes the digest from the binding's *current* claim hash,
//! so verification is live, never cached: a `failed` capsule can flip to
//! `ok` after the binding is corrected.

use serde::{Deserialize, Serialize};

use crate::address::WalletAddress;

/// What the capsule attests to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapsuleType {
    OfferProof,
    DeliveryProof,
    IdentityProof,
}

impl CapsuleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OfferProof => "OfferProof",
            Self::DeliveryProof => "DeliveryProof",
            Self::IdentityProof => "IdentityProof",
        }
    }
}

impl std::fmt::Display for CapsuleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verification state of a capsule.
///
/// `unverified → ok` is terminal in practice; `unverified → failed` is not —
/// re-verification against a corrected binding may still reach `ok`. No
/// transition ever returns to `unverified`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerifyStatus {
    Unverified,
    Ok,
    Failed,
}

impl VerifyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unverified => "unverified",
            Self::Ok => "ok",
            Self::Failed => "failed",
        }
    }
}

/// A stored proof capsule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capsule {
    /// Store-assigned record id (`capsule-…`).
    pub id: String,
    pub agent_slug: String,
    /// Publisher's wallet address.
    pub owner_address: WalletAddress,
    pub capsule_type: CapsuleType,
    /// The attested result payload, hashed verbatim into the proof.
    pub result: String,
    /// Client-computed `0x` + SHA-256 hex over `result|claim_hash|created_at`.
    pub proof_hash: String,
    /// Mock transaction hash assigned at creation (`0x` + 64 random hex).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    /// Creation timestamp chosen at generate time, preserved byte-for-byte —
    /// it participates in the proof-hash input.
    pub created_at: String,
    pub verify_status: VerifyStatus,
}

/// Capsule submission — the caller-supplied fields.
///
/// `proof_hash` and `created_at` must already exist when the capsule is
/// published: the generate-then-publish order is mandatory, and submissions
/// without them fail field validation upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapsuleDraft {
    pub agent_slug: String,
    pub owner_address: WalletAddress,
    pub capsule_type: CapsuleType,
    pub result: String,
    pub proof_hash: String,
    pub created_at: String,
}

impl CapsuleDraft {
    /// Materialize the draft into a stored record.
    pub fn into_capsule(self, id: String, tx_hash: String) -> Capsule {
        Capsule {
            id,
            agent_slug: self.agent_slug,
            owner_address: self.owner_address,
            capsule_type: self.capsule_type,
            result: self.result,
            proof_hash: self.proof_hash,
            tx_hash: Some(tx_hash),
            created_at: self.created_at,
            verify_status: VerifyStatus::Unverified,
        }
    }
}
