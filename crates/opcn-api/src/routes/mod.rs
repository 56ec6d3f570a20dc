//! # API Route Modules
//!
//! - `onchain` — wallet bindings and mock credential minting.
//! - `capsules` — proof capsule publishing, listing, and verification.
//! - `admin` — store reset, guarded by the admin token.

pub mod admin;
pub mod capsules;
pub mod onchain;
