//! Transport that dispatches straight into a local server

use std::sync::Arc;

use async_trait::async_trait;
use barrister_server::Server;
use tracing::debug;

use super::Transport;
use crate::error::TransportError;

/// Calls a [`Server`] in the same process, without any network hop
#[derive(Debug, Clone)]
pub struct InProcessTransport {
    server: Arc<Server>,
}

impl InProcessTransport {
    pub fn new(server: Arc<Server>) -> Self {
        Self { server }
    }
}

#[async_trait]
impl Transport for InProcessTransport {
    async fn send(&self, request: Vec<u8>) -> Result<Vec<u8>, TransportError> {
        debug!(bytes = request.len(), "Dispatching in-process request");
        let server = Arc::clone(&self.server);
        tokio::task::spawn_blocking(move || server.invoke_json(&request))
            .await
            .map_err(|e| TransportError::Dispatch(e.to_string()))
    }
}
