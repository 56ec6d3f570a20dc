//! # Admin Token Authentication
//!
//! The only protected surface is `/admin/reset`. When `OPCN_ADMIN_TOKEN` is
//! set, reset requests must carry it as `Authorization: Bearer <token>`;
//! comparison is constant-time. When no token is configured the endpoint is
//! open, which the server binary logs loudly at startup.

use axum::http::{header, HeaderMap};
use subtle::ConstantTimeEq;

use crate::error::AppError;

/// A secret token that compares in constant time and never prints itself.
#[derive(Clone)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Constant-time equality against a candidate token.
    ///
    /// Length is checked first; only equal-length comparisons reach the
    /// constant-time path, so timing reveals length at most.
    pub fn verify(&self, candidate: &str) -> bool {
        let expected = self.0.as_bytes();
        let candidate = candidate.as_bytes();
        expected.len() == candidate.len() && bool::from(expected.ct_eq(candidate))
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretString(***)")
    }
}

/// Enforce the admin token on a request, when one is configured.
pub fn require_admin(headers: &HeaderMap, token: Option<&SecretString>) -> Result<(), AppError> {
    let Some(expected) = token else {
        return Ok(());
    };

    let provided = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    match provided {
        Some(candidate) if expected.verify(candidate) => Ok(()),
        Some(_) => Err(AppError::Unauthorized("invalid admin token".into())),
        None => Err(AppError::Unauthorized("missing admin token".into())),
    }
}
