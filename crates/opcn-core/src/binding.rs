//! # Wallet Bindings
//!
//! A binding associates a wallet address with an agent slug via a signed
//! claim hash. At most one binding exists per `(agent_slug, address)` pair
//! (address compared lower-cased); re-saving the pair overwrites the record
//! in place but keeps the original id.
//!
//! Status ladder: `bound` (signature recorded but not verified) and
//! `verified` (signature checked against the address). The flow that
//! produces these statuses deliberately fails open: a signature that does
//! not verify demotes the status instead of erroring, so callers can still
//! surface partial progress.

use serde::{Deserialize, Serialize};

use crate::address::WalletAddress;

/// Binding verification status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingStatus {
    /// Signature recorded, not verified against the address.
    Bound,
    /// Signature verified to recover the binding's address.
    Verified,
}

impl BindingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bound => "bound",
            Self::Verified => "verified",
        }
    }
}

impl std::fmt::Display for BindingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored wallet-to-agent binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Binding {
    /// Store-assigned record id (`bind-…`). Survives upserts.
    pub id: String,
    /// Wallet address, stored as given; matched case-insensitively.
    pub address: WalletAddress,
    /// Numeric chain id the wallet reported (mock — never dereferenced).
    pub chain_id: u64,
    /// The agent listing this wallet is bound to.
    pub agent_slug: String,
    /// `0x`-prefixed SHA-256 digest of the canonical claim snapshot.
    pub claim_hash: String,
    /// Signature over the bind message, hex-encoded.
    pub signature: String,
    /// Signing timestamp (ISO-8601 string, preserved byte-for-byte).
    pub created_at: String,
    pub status: BindingStatus,
}

/// A binding ready to be upserted — everything but the store-assigned id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingDraft {
    pub address: WalletAddress,
    pub chain_id: u64,
    pub agent_slug: String,
    pub claim_hash: String,
    pub signature: String,
    pub created_at: String,
    pub status: BindingStatus,
}

impl BindingDraft {
    /// Materialize the draft into a record with the given id.
    pub fn into_binding(self, id: String) -> Binding {
        Binding {
            id,
            address: self.address,
            chain_id: self.chain_id,
            agent_slug: self.agent_slug,
            claim_hash: self.claim_hash,
            signature: self.signature,
            created_at: self.created_at,
            status: self.status,
        }
    }
}

impl Binding {
    /// Whether this record is the binding for the given `(slug, address)` key.
    pub fn is_for(&self, agent_slug: &str, address: &WalletAddress) -> bool {
        self.agent_slug == agent_slug && self.address.matches(address)
    }
}
