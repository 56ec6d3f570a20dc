//! # Sign-and-Bind Flow
//!
//! Composes the bind message, signs it with the connected wallet, verifies
//! the signature, and produces a [`BindingDraft`] ready for upsert.
//!
//! The status decision fails open: a signature that does not verify is
//! still recorded, with status demoted to `bound` instead of `verified`,
//! so callers can display partial progress. The only hard failure is the
//! absence of a signing identity.

use opcn_core::{BindingDraft, BindingStatus};
use thiserror::Error;

use crate::wallet::WalletKeyPair;

/// Failure modes of the sign-and-bind flow.
///
/// Note what is *not* here: signature verification failure. That path
/// demotes the binding status rather than erroring.
#[derive(Debug, Error)]
pub enum BindError {
    /// No connected wallet to sign with.
    #[error("no connected signing identity")]
    NoIdentity,
}

/// Compose the message a wallet signs when binding to an agent listing.
pub fn bind_message(agent_slug: &str, claim_hash: &str, timestamp: &str) -> String {
    format!("OPCN Bind: {agent_slug} | {claim_hash} | {timestamp}")
}

/// Sign a bind claim and build the binding draft.
///
/// Signs `bind_message(agent_slug, claim_hash, timestamp)` with the wallet,
/// then verifies the signature against the wallet's own address:
/// `verified` on success, `bound` otherwise. Returns [`BindError::NoIdentity`]
/// when `wallet` is `None`.
pub fn sign_and_bind(
    wallet: Option<&WalletKeyPair>,
    chain_id: u64,
    agent_slug: &str,
    claim_hash: &str,
    timestamp: &str,
) -> Result<BindingDraft, BindError> {
    let wallet = wallet.ok_or(BindError::NoIdentity)?;
    let address = wallet.address();
    let message = bind_message(agent_slug, claim_hash, timestamp);
    let signature = wallet.sign_message(&message);

    let status = match signature.verify(&message, &address) {
        Ok(()) => BindingStatus::Verified,
        Err(_) => BindingStatus::Bound,
    };

    Ok(BindingDraft {
        address,
        chain_id,
        agent_slug: agent_slug.to_string(),
        claim_hash: claim_hash.to_string(),
        signature: signature.to_hex(),
        created_at: timestamp.to_string(),
        status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::verify_bind_signature;

    #[test]
    fn message_format() {
        assert_eq!(
            bind_message("opc-growth-studio", "0xabc", "2024-01-01T00:00:00.000Z"),
            "OPCN Bind: opc-growth-studio | 0xabc | 2024-01-01T00:00:00.000Z"
        );
    }

    #[test]
    fn happy_path_yields_verified() {
        let wallet = WalletKeyPair::generate();
        let draft = sign_and_bind(
            Some(&wallet),
            11155111,
            "opc-growth-studio",
            "0xabc",
            "2024-01-01T00:00:00.000Z",
        )
        .unwrap();

        assert_eq!(draft.status, BindingStatus::Verified);
        assert_eq!(draft.address, wallet.address());
        assert_eq!(draft.chain_id, 11155111);

        // The recorded signature stands on its own.
        let message = bind_message("opc-growth-studio", "0xabc", "2024-01-01T00:00:00.000Z");
        verify_bind_signature(&draft.signature, &message, &draft.address)
            .expect("stored signature should verify");
    }

    #[test]
    fn no_wallet_is_the_only_hard_failure() {
        let err = sign_and_bind(None, 1, "slug", "0xabc", "t").unwrap_err();
        assert!(matches!(err, BindError::NoIdentity));
    }

    #[test]
    fn recorded_signature_does_not_verify_for_other_message() {
        let wallet = WalletKeyPair::generate();
        let draft = sign_and_bind(Some(&wallet), 1, "slug", "0xabc", "t1").unwrap();
        let other = bind_message("slug", "0xdef", "t1");
        assert!(verify_bind_signature(&draft.signature, &other, &draft.address).is_err());
    }
}
