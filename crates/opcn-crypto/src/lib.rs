//! # opcn-crypto — Hashing and Mock Wallet Identity
//!
//! Cryptographic building blocks for the onchain layer:
//!
//! - **Proof digests** ([`digest`]): `0x`-prefixed lowercase SHA-256 hex
//!   strings, and the `result|claim_hash|created_at` proof-hash recipe.
//! - **Claim hashing** ([`claim`]): digest of a canonical agent-metadata
//!   snapshot, the anchor value wallets sign.
//! - **Mock wallet** ([`wallet`]): Ed25519 key pairs with a derived `0x`
//!   address; signatures embed the public key so verifiers can recover the
//!   signer address without key directories.
//! - **Sign-and-bind** ([`bind`]): composes the bind message, signs it, and
//!   decides the `verified`/`bound` status — failing open on verification
//!   mismatch per the binding flow contract.
//!
//! None of this talks to a real chain; the wallet is a local key pair and
//! the "address" is a truncated hash of its public key.

pub mod bind;
pub mod claim;
pub mod digest;
pub mod error;
pub mod wallet;

// Re-export primary types.
pub use bind::{bind_message, sign_and_bind, BindError};
pub use claim::{claim_hash, AgentSnapshot};
pub use digest::{digests_match, mock_tx_hash, proof_hash, sha256_hex_0x};
pub use error::CryptoError;
pub use wallet::{recover_address, verify_bind_signature, WalletKeyPair, WalletSignature};
