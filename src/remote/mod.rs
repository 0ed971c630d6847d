//! Remote homework status endpoint.
//!
//! The poller reaches the endpoint through the [`Fetcher`] trait so the
//! transport can be swapped out in tests. Everything above the raw
//! transport (status code handling, JSON parsing, shape validation) lives
//! here.

mod http;
mod response;

pub use http::HttpFetcher;
pub use response::{RemoteResponse, Verdict, extract_notification, validate_response};

use async_trait::async_trait;
use bytes::Bytes;
use secrecy::{ExposeSecret, SecretString};

use crate::error::{PollError, TransportError};

/// A single request for status updates since `from_date`.
pub struct StatusRequest {
    /// Endpoint URL.
    pub url: String,
    /// Value of the `Authorization` header.
    pub authorization: SecretString,
    /// Lower bound of the fetch window, in seconds since epoch.
    pub from_date: i64,
}

impl StatusRequest {
    /// Build a request authorised with an OAuth token.
    pub fn new(url: impl Into<String>, token: &SecretString, from_date: i64) -> Self {
        Self {
            url: url.into(),
            authorization: SecretString::from(format!("OAuth {}", token.expose_secret())),
            from_date,
        }
    }
}

/// What the transport got back, before any interpretation.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Bytes,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Transport capability used to reach the status endpoint.
///
/// Implementations are expected to enforce their own request timeout.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &StatusRequest) -> Result<RawResponse, TransportError>;
}

const HTTP_OK: u16 = 200;

/// Fetch the raw status payload and parse it as JSON.
///
/// Only `200 OK` is accepted; redirects and rate limiting are not treated
/// specially.
pub async fn fetch_status(
    fetcher: &dyn Fetcher,
    request: &StatusRequest,
) -> Result<serde_json::Value, PollError> {
    tracing::debug!(
        url = %request.url,
        from_date = request.from_date,
        "Requesting homework statuses"
    );

    let response = fetcher
        .fetch(request)
        .await
        .map_err(PollError::EndpointUnavailable)?;

    if response.status != HTTP_OK {
        let reason = reqwest::StatusCode::from_u16(response.status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("unknown")
            .to_string();
        return Err(PollError::InvalidResponseCode {
            code: response.status,
            reason,
        });
    }

    serde_json::from_slice(&response.body)
        .map_err(|e| PollError::MalformedResponseBody(e.to_string()))
}
