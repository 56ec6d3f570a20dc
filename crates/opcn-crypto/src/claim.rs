//! # Claim Hashing
//!
//! The claim hash is the anchor value a wallet signs when binding to an
//! agent listing: a digest of the agent-metadata snapshot (display name,
//! headline, tags, offers, delivery notes, slug, timestamp).
//!
//! Snapshots are canonicalized (RFC 8785: sorted keys, compact separators)
//! before hashing, so two logically identical snapshots hash identically
//! regardless of key order or formatting. Anything serde can serialize
//! without floats is a valid snapshot.

use opcn_core::CanonicalBytes;
use serde::{Deserialize, Serialize};

use crate::digest::sha256_hex_0x;
use crate::error::CryptoError;

/// Digest a snapshot into a `0x` + 64 hex claim hash.
///
/// Pure: no side effects, deterministic per canonical content. The only
/// error path is canonicalization failure (floats or unserializable input),
/// which typed snapshots do not hit.
pub fn claim_hash(snapshot: &impl Serialize) -> Result<String, CryptoError> {
    let canonical = CanonicalBytes::new(snapshot)?;
    // Canonical bytes are valid UTF-8 JSON by construction.
    let json = String::from_utf8_lossy(canonical.as_bytes()).into_owned();
    Ok(sha256_hex_0x(&json))
}

/// The agent-metadata snapshot a binding claim is computed over.
///
/// Offers stay schemaless (`serde_json::Value`): the marketplace owns their
/// shape and the claim layer only needs stable bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSnapshot {
    pub display_name: String,
    pub headline: String,
    pub tags: Vec<String>,
    pub offers: Vec<serde_json::Value>,
    pub delivery_notes: String,
    pub agent_slug: String,
    /// Snapshot timestamp (ISO-8601 string).
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> AgentSnapshot {
        AgentSnapshot {
            display_name: "Growth Studio".into(),
            headline: "Turn your agent into a bookable service page".into(),
            tags: vec!["growth".into(), "leads".into()],
            offers: vec![serde_json::json!({"tier": "starter", "price": 199})],
            delivery_notes: "Page publish plus lead handoff.".into(),
            agent_slug: "opc-growth-studio".into(),
            created_at: "2024-01-01T00:00:00.000Z".into(),
        }
    }

    #[test]
    fn claim_hash_shape() {
        let h = claim_hash(&snapshot()).unwrap();
        assert_eq!(h.len(), 66);
        assert!(h.starts_with("0x"));
    }

    #[test]
    fn identical_snapshots_hash_identically() {
        assert_eq!(claim_hash(&snapshot()).unwrap(), claim_hash(&snapshot()).unwrap());
    }

    #[test]
    fn key_order_does_not_matter() {
        let a = serde_json::json!({"displayName": "X", "agentSlug": "s"});
        let b = serde_json::json!({"agentSlug": "s", "displayName": "X"});
        assert_eq!(claim_hash(&a).unwrap(), claim_hash(&b).unwrap());
    }

    #[test]
    fn content_change_changes_the_hash() {
        let mut other = snapshot();
        other.headline = "different".into();
        assert_ne!(claim_hash(&snapshot()).unwrap(), claim_hash(&other).unwrap());
    }

    #[test]
    fn float_offers_are_rejected() {
        let mut bad = snapshot();
        bad.offers = vec![serde_json::json!({"price": 19.9})];
        assert!(matches!(claim_hash(&bad), Err(CryptoError::Canonicalization(_))));
    }
}
