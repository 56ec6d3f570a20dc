//! # Proof Digests
//!
//! All content hashes in the onchain layer are `0x`-prefixed lowercase
//! SHA-256 hex strings (66 characters total). The proof hash for a capsule
//! digests the literal string `result|claim_hash|created_at` — the three
//! components joined with `|`, no canonicalization, because `created_at`
//! and `claim_hash` are already opaque strings that must participate
//! byte-for-byte.

use rand_core::{OsRng, RngCore};
use sha2::{Digest, Sha256};

/// Separator between proof-hash input components.
const PROOF_SEPARATOR: char = '|';

/// SHA-256 of the input string as `0x` + 64 lowercase hex digits.
pub fn sha256_hex_0x(input: &str) -> String {
    let hash = Sha256::digest(input.as_bytes());
    let mut out = String::with_capacity(66);
    out.push_str("0x");
    for b in hash {
        out.push_str(&format!("{b:02x}"));
    }
    out
}

/// The capsule proof digest: `SHA256Hex(result + "|" + claim_hash + "|" + created_at)`.
///
/// Deterministic: identical `(result, claim_hash, created_at)` triples
/// always produce byte-identical output.
pub fn proof_hash(result: &str, claim_hash: &str, created_at: &str) -> String {
    sha256_hex_0x(&format!(
        "{result}{PROOF_SEPARATOR}{claim_hash}{PROOF_SEPARATOR}{created_at}"
    ))
}

/// Case-insensitive digest comparison, used by the verifier: stored proof
/// hashes may carry mixed-case hex from foreign clients.
pub fn digests_match(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// A simulated transaction hash: `0x` + 64 random lowercase hex chars.
///
/// Shaped like a real chain receipt but backed by nothing; assigned to
/// capsules at creation so clients can render an explorer-style link.
pub fn mock_tx_hash() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    let mut out = String::with_capacity(66);
    out.push_str("0x");
    for b in bytes {
        out.push_str(&format!("{b:02x}"));
    }
    out
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Determinism over arbitrary input triples.
        #[test]
        fn proof_hash_deterministic(
            result in ".{0,64}",
            claim in "0x[0-9a-f]{0,64}",
            ts in "[0-9T:.Z-]{0,30}",
        ) {
            prop_assert_eq!(
                proof_hash(&result, &claim, &ts),
                proof_hash(&result, &claim, &ts)
            );
        }

        /// Output is always a well-formed 0x digest.
        #[test]
        fn proof_hash_shape(input in ".{0,128}") {
            let h = sha256_hex_0x(&input);
            prop_assert_eq!(h.len(), 66);
            prop_assert!(h.starts_with("0x"));
        }
    }
}
