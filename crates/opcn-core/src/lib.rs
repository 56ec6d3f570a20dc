//! # opcn-core — Domain Model for the OPCN Onchain Layer
//!
//! Foundational types shared by the store and API crates:
//!
//! - **Wallet bindings** ([`binding`]): a wallet address bound to an agent
//!   slug through a signed claim, with a `bound → verified` status ladder.
//! - **Credentials** ([`credential`]): mock non-transferable identity tokens,
//!   minted at most once per address.
//! - **Proof capsules** ([`capsule`]): offer/delivery/identity proof records
//!   carrying a verifiable content hash and a mock transaction hash.
//! - **Canonical serialization** ([`canonical`]): RFC 8785 (JCS) byte
//!   production for claim-snapshot hashing, so logically identical snapshots
//!   digest identically.
//!
//! Nothing in this crate talks to a real blockchain. Addresses, transaction
//! hashes, and credentials are simulated records in an ordinary data store.

pub mod address;
pub mod binding;
pub mod canonical;
pub mod capsule;
pub mod credential;
pub mod error;
pub mod id;

// Re-export primary types.
pub use address::WalletAddress;
pub use binding::{Binding, BindingDraft, BindingStatus};
pub use canonical::CanonicalBytes;
pub use capsule::{Capsule, CapsuleDraft, CapsuleType, VerifyStatus};
pub use credential::{Credential, CredentialStatus};
pub use error::CanonicalizationError;
pub use id::record_id;

/// Current UTC timestamp as an ISO-8601 string with millisecond precision
/// and a `Z` suffix, e.g. `2024-01-01T00:00:00.000Z`.
///
/// Timestamps are carried as strings throughout the onchain layer because
/// they participate byte-for-byte in proof-hash inputs — reparsing and
/// reformatting a stored `created_at` would silently change the digest.
pub fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
