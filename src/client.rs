//! The request dispatcher.

use log::debug;
use serde_json::Value;
use std::sync::Arc;

use crate::compression::{REQUEST_COMPRESSION, compress};
use crate::config::ClientConfig;
use crate::encoding::normalize;
use crate::error::ApiError;
use crate::http::{HttpTransport, PostRequest, Transport, TransportResponse, with_failover};
use crate::params::Params;

/// Outcome of an API call.
///
/// `Err(ApiError::Unreachable { .. })` means no attempt reached the service;
/// `Err(ApiError::Decode { .. })` means it answered with something other than JSON.
pub type ApiResult = Result<Value, ApiError>;

/// UniSender API client.
///
/// Any remote method can be invoked through [`Client::call`]; typed helpers
/// for the documented methods live alongside it.
#[derive(Clone)]
pub struct Client {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
}

impl Client {
    /// Creates a client using the default HTTP transport.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let transport = HttpTransport::with_default_client()
            .map_err(|e| ApiError::Config(format!("{:#}", e)))?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Creates a client sending requests through `transport`.
    pub fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ApiError> {
        config.validate()?;
        Ok(Self { config, transport })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Toggles the service-side test mode for subsequent calls.
    pub fn set_test_mode(&mut self, test_mode: bool) {
        self.config.set_test_mode(test_mode);
    }

    /// Calls a remote method and decodes its JSON response.
    ///
    /// Transport failures are retried immediately, alternating between the
    /// two hosts, up to the configured retry count.
    #[tracing::instrument(skip(self, params))]
    pub async fn call(&self, method: &str, params: Params) -> ApiResult {
        let params = normalize(params, self.config.source_encoding());
        let (query, body) = self.encode(params)?;
        let timeout = self.config.request_timeout();

        let response = with_failover(
            method,
            self.config.host_pair(),
            self.config.attempts(),
            |host| {
                let transport = Arc::clone(&self.transport);
                let request = PostRequest {
                    url: format!("{}{}", host, method),
                    query: query.clone(),
                    body: body.clone(),
                    timeout,
                };
                async move { transport.post(request).await }
            },
        )
        .await?;

        decode(response)
    }

    /// Builds the query string and body for one call.
    ///
    /// The API key goes in the body, or in the query when the body is
    /// compressed.
    fn encode(&self, mut params: Params) -> Result<(Vec<(String, String)>, Vec<u8>), ApiError> {
        let mut query = vec![
            ("format".to_string(), "json".to_string()),
            (
                "test_mode".to_string(),
                if self.config.is_test_mode() { "1" } else { "0" }.to_string(),
            ),
        ];

        let body = if self.config.is_compressed() {
            query.push((
                "request_compression".to_string(),
                REQUEST_COMPRESSION.to_string(),
            ));
            query.push(("api_key".to_string(), self.config.api_key().to_string()));
            compress(&params.to_form()).map_err(ApiError::Compression)?
        } else {
            params.insert("api_key", self.config.api_key());
            params.to_form()
        };

        Ok((query, body))
    }
}

fn decode(response: TransportResponse) -> ApiResult {
    debug!("Decoding {} byte response (HTTP {})", response.body.len(), response.status);
    serde_json::from_slice(&response.body).map_err(|source| ApiError::Decode {
        status: response.status,
        source,
    })
}
