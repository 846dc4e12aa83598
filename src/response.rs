//! Raw transport responses and their validation.
//!
//! A [`RawResponse`] is what a [`Transport`](crate::Transport) hands back.
//! Converting it into a value enforces the success criterion: only an exact
//! `200 OK` succeeds. `201`, `204` and every other 2xx are errors, like any
//! other status, including values outside the HTTP range.

use crate::status::StatusCategory;
use crate::{codec, Error, Result};
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;

/// An HTTP response as received from the transport.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// The numeric status code.
    pub status: u16,
    /// The response headers.
    pub headers: HeaderMap,
    /// The full response body.
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Creates a new `RawResponse`.
    pub fn new(status: u16, headers: HeaderMap, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Validates the status and decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidStatusCode`] if the status is not exactly `200`
    /// * [`Error::DecodeFailure`] if the body does not decode into `T`
    ///
    /// # Examples
    ///
    /// ```
    /// use api_manager::{Error, RawResponse, StatusCategory};
    /// use http::HeaderMap;
    ///
    /// let ok = RawResponse::new(200, HeaderMap::new(), r#"{"status":"success"}"#);
    /// let value: serde_json::Value = ok.into_json().unwrap();
    /// assert_eq!(value["status"], "success");
    ///
    /// let created = RawResponse::new(201, HeaderMap::new(), "{}");
    /// assert!(matches!(
    ///     created.into_json::<serde_json::Value>(),
    ///     Err(Error::InvalidStatusCode { code: 201, category: StatusCategory::Success(201), .. })
    /// ));
    /// ```
    pub fn into_json<T>(self) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.validate()?;
        codec::decode(&self.body)
    }

    /// Validates the status and returns the body unchanged.
    ///
    /// # Errors
    ///
    /// Same as [`RawResponse::into_json`], minus decoding.
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        self.validate()?;
        Ok(self.body)
    }

    /// Returns a header value as a string, if present and valid ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    fn validate(&self) -> Result<()> {
        if self.status == StatusCode::OK.as_u16() {
            return Ok(());
        }

        let category = StatusCategory::classify(self.status);
        let raw_response = String::from_utf8_lossy(&self.body).into_owned();

        match category {
            StatusCategory::ClientError(_) => {
                tracing::error!(
                    status = self.status,
                    response = %raw_response,
                    "Client error (4xx)"
                );
            }
            StatusCategory::ServerError(_) => {
                tracing::warn!(
                    status = self.status,
                    response = %raw_response,
                    "Server error (5xx)"
                );
            }
            _ => {
                tracing::warn!(
                    status = self.status,
                    category = %category,
                    "Unexpected response status"
                );
            }
        }

        Err(Error::InvalidStatusCode {
            code: self.status,
            category,
            raw_response,
        })
    }
}
