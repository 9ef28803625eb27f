//! The HTTP seam: one POST attempt, no retries.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// A fully built request for a single attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct PostRequest {
    /// Host base URL joined with the method name, without query string.
    pub url: String,
    pub query: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub timeout: Duration,
}

/// Whatever the server answered, error statuses included.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Sends one POST. An `Err` means the exchange itself failed
/// (connect, timeout, truncated body); HTTP error statuses are `Ok`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(&self, request: PostRequest) -> Result<TransportResponse>;
}

/// [`Transport`] backed by a shared reqwest client.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Creates a transport wrapping the given reqwest Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Creates a transport with a client identifying this crate in `User-Agent`.
    pub fn with_default_client() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("unisender-rs/", env!("UNISENDER_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self::new(client))
    }

    /// Returns a reference to the underlying reqwest Client.
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, request: PostRequest) -> Result<TransportResponse> {
        debug!("POST {} ({} bytes)", request.url, request.body.len());

        // The query may carry the API key, so errors drop the URL.
        let response = self
            .client
            .post(&request.url)
            .query(&request.query)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .timeout(request.timeout)
            .body(request.body)
            .send()
            .await
            .map_err(|e| e.without_url())
            .context("Failed to send request")?;

        let status = response.status().as_u16();

        let body = response
            .bytes()
            .await
            .map_err(|e| e.without_url())
            .context("Failed to read response body")?;

        debug!("HTTP {} ({} bytes)", status, body.len());

        Ok(TransportResponse {
            status,
            body: body.to_vec(),
        })
    }
}
