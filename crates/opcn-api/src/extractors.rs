//! # Validated JSON Extraction
//!
//! Request bodies are extracted as `Result<Json<T>, JsonRejection>` so a
//! malformed body becomes a structured 400 instead of Axum's default
//! rejection, then field-checked through [`Validate`].

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::error::AppError;

/// Field-level request validation.
///
/// Request DTOs default their fields on deserialization, so a missing field
/// arrives as empty rather than failing serde. `validate` is where "field is
/// required" becomes an error, with a message naming the field.
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

/// Unwrap a JSON extraction result and validate the payload.
///
/// Both failure modes map to [`AppError::Validation`] (400): unparseable
/// bodies and missing/invalid fields are the same class of client error on
/// this surface.
pub fn extract_validated_json<T: Validate>(
    body: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let Json(value) = body.map_err(|rejection| AppError::Validation(rejection.body_text()))?;
    value.validate().map_err(AppError::Validation)?;
    Ok(value)
}
