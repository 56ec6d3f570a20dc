//! # Mock Identity Credentials
//!
//! A credential is a simulated non-transferable token recording that an
//! address completed the onchain identity flow. Minting is idempotent per
//! address (case-insensitive): a second mint returns the existing record
//! unchanged.

use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::address::WalletAddress;

/// Credential lifecycle status. Only one state exists in the mock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialStatus {
    Minted,
}

/// A minted credential record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    /// Holder address, stored as given; matched case-insensitively.
    pub address: WalletAddress,
    /// Random 6-digit numeral. No collision guarantee — acceptable
    /// for the mock.
    pub token_id: String,
    /// Mint timestamp (ISO-8601 string).
    pub minted_at: String,
    pub status: CredentialStatus,
}

impl Credential {
    /// Mint a fresh credential for the address with a random token id.
    pub fn mint(address: WalletAddress) -> Self {
        Self {
            address,
            token_id: random_token_id(),
            minted_at: crate::now_iso(),
            status: CredentialStatus::Minted,
        }
    }
}

/// A random 6-digit token id in `100000..=999999`.
fn random_token_id() -> String {
    let n = OsRng.next_u32() % 900_000 + 100_000;
    n.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_id_is_six_digits() {
        for _ in 0..32 {
            let c = Credential::mint(WalletAddress::new("0xabc"));
            assert_eq!(c.token_id.len(), 6, "got: {}", c.token_id);
            assert!(c.token_id.chars().all(|ch| ch.is_ascii_digit()));
            assert!(!c.token_id.starts_with('0'));
        }
    }

    #[test]
    fn wire_format_is_camel_case() {
        let c = Credential::mint(WalletAddress::new("0xAbC"));
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["address"], "0xAbC");
        assert_eq!(json["status"], "minted");
        assert!(json["tokenId"].is_string());
        assert!(json["mintedAt"].is_string());
    }
}
