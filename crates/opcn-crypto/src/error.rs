//! Crypto-layer error types.

use thiserror::Error;

/// Errors from digest, key, and signature operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Claim snapshot could not be canonicalized for hashing.
    #[error("claim canonicalization failed: {0}")]
    Canonicalization(#[from] opcn_core::CanonicalizationError),

    /// A key or signature could not be parsed from its wire form.
    #[error("malformed {what}: {detail}")]
    Malformed { what: &'static str, detail: String },

    /// The signature does not verify over the message.
    #[error("signature verification failed: {0}")]
    VerificationFailed(String),

    /// The embedded public key does not derive the claimed address.
    #[error("signer address mismatch: signature recovers {recovered}, claimed {claimed}")]
    AddressMismatch { recovered: String, claimed: String },
}

impl CryptoError {
    pub(crate) fn malformed(what: &'static str, detail: impl Into<String>) -> Self {
        Self::Malformed {
            what,
            detail: detail.into(),
        }
    }
}
