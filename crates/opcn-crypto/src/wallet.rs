//! # Mock Wallet Identity
//!
//! The onchain layer never talks to a real chain, so the "wallet" is a
//! local Ed25519 key pair. Its address is `0x` + the first 20 bytes of
//! `sha256(public_key)` in lowercase hex — ethereum-shaped, derived purely
//! locally.
//!
//! Ed25519 has no public-key recovery from a signature, so the wire form
//! embeds the public key: `0x` + 32-byte public key + 64-byte signature
//! (194 hex characters total). Verifiers recover the signer address from
//! the embedded key, then check it against the claimed address before
//! checking the signature itself.
//!
//! Private keys are never serialized or logged; `WalletKeyPair` does not
//! implement `Serialize` and its `Debug` output is redacted.

use ed25519_dalek::{Signer, Verifier};
use opcn_core::WalletAddress;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::error::CryptoError;

/// An Ed25519 key pair acting as the connected wallet.
pub struct WalletKeyPair {
    signing_key: ed25519_dalek::SigningKey,
}

/// A bind signature: embedded public key plus Ed25519 signature.
///
/// Serializes as the `0x`-prefixed hex wire form.
#[derive(Clone, PartialEq, Eq)]
pub struct WalletSignature {
    public_key: [u8; 32],
    signature: [u8; 64],
}

impl WalletKeyPair {
    /// Generate a fresh random wallet.
    pub fn generate() -> Self {
        let mut csprng = rand_core::OsRng;
        Self {
            signing_key: ed25519_dalek::SigningKey::generate(&mut csprng),
        }
    }

    /// Deterministic wallet from a 32-byte seed (tests and demos).
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: ed25519_dalek::SigningKey::from_bytes(seed),
        }
    }

    /// The wallet's derived address.
    pub fn address(&self) -> WalletAddress {
        derive_address(&self.signing_key.verifying_key().to_bytes())
    }

    /// Sign an arbitrary message string.
    pub fn sign_message(&self, message: &str) -> WalletSignature {
        let sig = self.signing_key.sign(message.as_bytes());
        WalletSignature {
            public_key: self.signing_key.verifying_key().to_bytes(),
            signature: sig.to_bytes(),
        }
    }
}

impl std::fmt::Debug for WalletKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "WalletKeyPair({})", self.address())
    }
}

impl WalletSignature {
    /// Render the wire form: `0x` + pubkey hex + signature hex.
    pub fn to_hex(&self) -> String {
        let mut out = String::with_capacity(194);
        out.push_str("0x");
        for b in self.public_key.iter().chain(self.signature.iter()) {
            out.push_str(&format!("{b:02x}"));
        }
        out
    }

    /// Parse the wire form produced by [`WalletSignature::to_hex`].
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        let body = hex.strip_prefix("0x").unwrap_or(hex);
        if body.len() != 192 {
            return Err(CryptoError::malformed(
                "signature",
                format!("expected 192 hex chars after 0x, got {}", body.len()),
            ));
        }
        let bytes = hex_to_bytes(body).map_err(|e| CryptoError::malformed("signature", e))?;
        let mut public_key = [0u8; 32];
        let mut signature = [0u8; 64];
        public_key.copy_from_slice(&bytes[..32]);
        signature.copy_from_slice(&bytes[32..]);
        Ok(Self {
            public_key,
            signature,
        })
    }

    /// The address the embedded public key derives to.
    pub fn signer_address(&self) -> WalletAddress {
        derive_address(&self.public_key)
    }

    /// Verify this signature over the message, checking that the signer
    /// address matches the claimed address (case-insensitive) first.
    pub fn verify(&self, message: &str, claimed: &WalletAddress) -> Result<(), CryptoError> {
        let recovered = self.signer_address();
        if !recovered.matches(claimed) {
            return Err(CryptoError::AddressMismatch {
                recovered: recovered.to_string(),
                claimed: claimed.to_string(),
            });
        }
        let vk = ed25519_dalek::VerifyingKey::from_bytes(&self.public_key)
            .map_err(|e| CryptoError::malformed("public key", e.to_string()))?;
        let sig = ed25519_dalek::Signature::from_bytes(&self.signature);
        vk.verify(message.as_bytes(), &sig)
            .map_err(|e| CryptoError::VerificationFailed(e.to_string()))
    }
}

impl Serialize for WalletSignature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for WalletSignature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for WalletSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "WalletSignature({}…)", &self.to_hex()[..10])
    }
}

impl std::fmt::Display for WalletSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Recover the signer address from a hex signature without verifying it.
pub fn recover_address(signature_hex: &str) -> Result<WalletAddress, CryptoError> {
    Ok(WalletSignature::from_hex(signature_hex)?.signer_address())
}

/// Verify a hex-encoded bind signature over a message against a claimed
/// address. The result feeds the `verified`/`bound` status decision — a
/// failure here demotes, it does not abort.
pub fn verify_bind_signature(
    signature_hex: &str,
    message: &str,
    claimed: &WalletAddress,
) -> Result<(), CryptoError> {
    WalletSignature::from_hex(signature_hex)?.verify(message, claimed)
}

/// `0x` + first 20 bytes of `sha256(public_key)`, lowercase hex.
fn derive_address(public_key: &[u8; 32]) -> WalletAddress {
    let hash = Sha256::digest(public_key);
    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for b in &hash[..20] {
        out.push_str(&format!("{b:02x}"));
    }
    WalletAddress::new(out)
}

fn hex_to_bytes(hex: &str) -> Result<Vec<u8>, String> {
    if hex.len() % 2 != 0 {
        return Err("hex string must have even length".to_string());
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|e| format!("invalid hex at position {i}: {e}"))
        })
        .collect()
}
