//! The network seam.
//!
//! [`Transport`] sends a built [`Request`] and returns whatever came back as a
//! [`RawResponse`]. [`ReqwestTransport`] is the default implementation; hosts
//! with their own HTTP stack can plug in anything else.

use crate::{RawResponse, Request};
use async_trait::async_trait;
use std::time::Duration;

/// Errors raised by a transport before a response was received.
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// The request timeout applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Sends requests over the network.
///
/// Returning `Err` means no well-formed response arrived (connection refused,
/// DNS failure, timeout, ...). Any response with a status line, whatever the
/// status, must be returned as `Ok`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `request` and waits for the full response.
    async fn send(&self, request: Request) -> Result<RawResponse, TransportError>;
}

/// A [`Transport`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http_client: reqwest::Client,
    timeout: Duration,
}

impl ReqwestTransport {
    /// Creates a transport that gives up on requests after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`](crate::Error::Configuration) if the
    /// underlying client cannot be built (for example, no TLS backend).
    pub fn new(timeout: Duration) -> crate::Result<Self> {
        let http_client = reqwest::Client::builder().build().map_err(|e| {
            crate::Error::Configuration(format!("Failed to build HTTP client: {}", e))
        })?;

        Ok(Self {
            http_client,
            timeout,
        })
    }

    /// Wraps an existing `reqwest::Client`.
    pub fn with_client(http_client: reqwest::Client, timeout: Duration) -> Self {
        Self {
            http_client,
            timeout,
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: Request) -> Result<RawResponse, TransportError> {
        let mut builder = self
            .http_client
            .request(request.method, request.url)
            .headers(request.headers)
            .timeout(self.timeout);

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(RawResponse::new(status, headers, body.to_vec()))
    }
}
