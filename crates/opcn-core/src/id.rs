//! Short prefixed record identifiers, e.g. `bind-k3f9x2qa`.
//!
//! Record ids are opaque handles, not security tokens: eight base-36
//! characters from the OS RNG are plenty for a demo store and keep the ids
//! readable in logs and URLs.

use rand_core::{OsRng, RngCore};

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const ID_LEN: usize = 8;

/// Generate a record id of the form `{prefix}-{8 base-36 chars}`.
pub fn record_id(prefix: &str) -> String {
    let mut bytes = [0u8; ID_LEN];
    OsRng.fill_bytes(&mut bytes);
    let suffix: String = bytes
        .iter()
        .map(|b| ALPHABET[(*b as usize) % ALPHABET.len()] as char)
        .collect();
    format!("{prefix}-{suffix}")
}
