//! # opcn-store — Onchain Collections Behind One Lock
//!
//! The repository layer for bindings, credentials, and proof capsules.
//! State is a single [`OnchainSnapshot`] guarded by a `parking_lot::RwLock`;
//! every compound operation (binding upsert, idempotent mint, capsule
//! verification) holds the write lock for its whole read-modify-write
//! sequence, so concurrent callers never interleave between lookup and
//! mutation.
//!
//! The snapshot doubles as the persistence format: [`OnchainStore::snapshot`]
//! and [`OnchainStore::restore`] move the entire state in and out as one
//! serializable value, which is how the optional database backend stores it.

pub mod snapshot;
pub mod store;

// Re-export primary types.
pub use snapshot::{OnchainSnapshot, StoreCounts};
pub use store::{CapsuleStatusCounts, OnchainStore, VerifyOutcome};
