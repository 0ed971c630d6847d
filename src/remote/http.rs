//! HTTP transport for the status endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;

use crate::error::TransportError;
use crate::remote::{Fetcher, RawResponse, StatusRequest};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// [`Fetcher`] backed by `reqwest`.
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpFetcher {
    /// Create a fetcher with the default request timeout.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_timeout(REQUEST_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client, timeout })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &StatusRequest) -> Result<RawResponse, TransportError> {
        let response = self
            .client
            .get(&request.url)
            .header(
                reqwest::header::AUTHORIZATION,
                request.authorization.expose_secret(),
            )
            .query(&[("from_date", request.from_date)])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError(format!("request timed out after {:?}", self.timeout))
                } else {
                    TransportError(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError(format!("failed to read response body: {}", e)))?;

        Ok(RawResponse { status, body })
    }
}
