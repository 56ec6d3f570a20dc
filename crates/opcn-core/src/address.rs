//! # Wallet Address Newtype
//!
//! Addresses are stored exactly as the caller supplied them but compared
//! case-insensitively everywhere: binding upserts, credential mints, and
//! lookups all key on the lower-cased form. The newtype keeps the two
//! concerns (display form vs. matching key) from being conflated.

use serde::{Deserialize, Serialize};

/// A mock wallet address (`0x` + 40 hex chars by convention).
///
/// Stored as given; matched lower-cased. The inner string is private so all
/// comparisons go through [`WalletAddress::matches`] or
/// [`WalletAddress::to_key`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletAddress(String);

impl WalletAddress {
    /// Wrap an address string, preserving its original casing.
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// The address exactly as supplied.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive equality with another address.
    pub fn matches(&self, other: &WalletAddress) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }

    /// Case-insensitive equality with a raw address string.
    pub fn matches_str(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }

    /// The lower-cased matching key used for upserts and lookups.
    pub fn to_key(&self) -> String {
        self.0.to_lowercase()
    }

    /// Whether the address is empty (no connected wallet).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WalletAddress {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for WalletAddress {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_is_case_insensitive() {
        let a = WalletAddress::new("0xAbCd1234");
        let b = WalletAddress::new("0xabcd1234");
        assert!(a.matches(&b));
        assert!(a.matches_str("0xABCD1234"));
        assert!(!a.matches_str("0xabcd9999"));
    }

    #[test]
    fn storage_preserves_casing() {
        let a = WalletAddress::new("0xAbCd");
        assert_eq!(a.as_str(), "0xAbCd");
        assert_eq!(a.to_key(), "0xabcd");
    }

    #[test]
    fn serializes_transparently() {
        let a = WalletAddress::new("0xAbCd");
        assert_eq!(serde_json::to_string(&a).unwrap(), r#""0xAbCd""#);
        let back: WalletAddress = serde_json::from_str(r#""0xAbCd""#).unwrap();
        assert_eq!(back, a);
    }
}
