//! JSON wire format.
//!
//! The target type is chosen at the call site: `from_wire::<Payment>(raw)`.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// The response body did not match the expected shape.
#[derive(Debug, Error)]
#[error("JSON error: {0}")]
pub struct DecodeError(#[from] serde_json::Error);

/// A payload value has no JSON representation.
#[derive(Debug, Error)]
#[error("Cannot encode payload: {0}")]
pub struct EncodeError(#[from] serde_json::Error);

/// Decode a raw response body.
pub fn from_wire<T: DeserializeOwned>(raw: &str) -> Result<T, DecodeError> {
    Ok(serde_json::from_str(raw)?)
}

/// Encode a request payload.
pub fn to_wire<T: Serialize + ?Sized>(value: &T) -> Result<String, EncodeError> {
    Ok(serde_json::to_string(value)?)
}
