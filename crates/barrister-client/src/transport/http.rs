//! HTTP transport backed by reqwest

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, warn};
use url::Url;

use super::Transport;
use crate::config::ClientConfig;
use crate::error::TransportError;

/// POSTs each request to a single endpoint
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: Url,
}

impl HttpTransport {
    /// Create a transport with the default configuration
    pub fn new(endpoint: &str) -> Result<Self, TransportError> {
        Self::with_config(endpoint, &ClientConfig::default())
    }

    /// Create a transport using the timeout and user agent from `config`
    pub fn with_config(endpoint: &str, config: &ClientConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(TransportError::Client)?;
        Self::with_client(endpoint, client)
    }

    /// Create a transport around an existing reqwest client
    pub fn with_client(endpoint: &str, client: Client) -> Result<Self, TransportError> {
        let url = Url::parse(endpoint).map_err(|e| TransportError::InvalidUrl {
            url: endpoint.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(TransportError::InvalidUrl {
                url: endpoint.to_string(),
                reason: format!("unsupported scheme {}", url.scheme()),
            });
        }

        Ok(Self {
            client,
            endpoint: url,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: Vec<u8>) -> Result<Vec<u8>, TransportError> {
        debug!(endpoint = %self.endpoint, bytes = request.len(), "Sending HTTP request");

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(request)
            .send()
            .await
            .map_err(|source| TransportError::Post {
                url: self.endpoint.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(endpoint = %self.endpoint, %status, "Server rejected request");
            return Err(TransportError::Status {
                url: self.endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(TransportError::ReadBody)?;
        Ok(body.to_vec())
    }
}
