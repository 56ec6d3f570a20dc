//! Structured error types for the domain layer.

use thiserror::Error;

/// Errors raised while producing canonical bytes for digest computation.
#[derive(Debug, Error)]
pub enum CanonicalizationError {
    /// Floats are rejected: their canonical number rendering has
    /// edge cases that break cross-implementation digest stability.
    /// Amounts must be integers or strings.
    #[error("float values are not canonicalizable (got {0}); use an integer or string")]
    FloatRejected(f64),

    /// The value could not be serialized to JSON at all.
    #[error("canonical serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
