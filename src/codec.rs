//! JSON encoding and decoding of request and response bodies.
//!
//! Dates inside payloads use the backend format through
//! [`crate::date::backend_date`]; everything else is plain `serde_json`.

use crate::{Error, Result};
use serde::{de::DeserializeOwned, Serialize};

/// Encodes a value as a JSON body.
///
/// # Errors
///
/// Returns [`Error::EncodeFailure`] if the value cannot be represented as JSON
/// (for example a map with non-string keys).
pub fn encode<T>(value: &T) -> Result<Vec<u8>>
where
    T: Serialize + ?Sized,
{
    serde_json::to_vec(value).map_err(|e| Error::EncodeFailure(e.to_string()))
}

/// Decodes a JSON body into `T`.
///
/// # Errors
///
/// Returns [`Error::DecodeFailure`] with the raw body preserved for debugging.
pub fn decode<T>(body: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    serde_json::from_slice(body).map_err(|e| {
        let raw_response = String::from_utf8_lossy(body).into_owned();
        tracing::error!(
            error = %e,
            raw_response = %raw_response,
            "Failed to decode response"
        );
        Error::DecodeFailure {
            raw_response,
            serde_error: e.to_string(),
        }
    })
}
