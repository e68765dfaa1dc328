//! Barrister client

use std::sync::Arc;

use barrister_idl::Contract;
use barrister_json_rpc::{IDL_METHOD, JsonRpcError, JsonRpcRequest, JsonRpcResponse};
use barrister_server::Server;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult, TransportError};
use crate::id::{IdGenerator, RandomIdGenerator};
use crate::serializer::JsonSerializer;
use crate::transport::{HttpTransport, InProcessTransport, Transport};

/// Calls methods on a Barrister server through a [`Transport`]
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
    serializer: JsonSerializer,
    ids: Arc<dyn IdGenerator>,
}

impl Client {
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
            serializer: JsonSerializer::default(),
            ids: Arc::new(RandomIdGenerator::default()),
        }
    }

    /// HTTP client with the default configuration
    pub fn http(endpoint: &str) -> Result<Self, TransportError> {
        Self::http_with_config(endpoint, &ClientConfig::default())
    }

    pub fn http_with_config(endpoint: &str, config: &ClientConfig) -> Result<Self, TransportError> {
        let transport = HttpTransport::with_config(endpoint, config)?;
        Ok(Self::new(transport).with_serializer(JsonSerializer::new(config.force_ascii)))
    }

    /// Client that dispatches into `server` directly
    pub fn in_process(server: Arc<Server>) -> Self {
        Self::new(InProcessTransport::new(server))
    }

    pub fn with_serializer(mut self, serializer: JsonSerializer) -> Self {
        self.serializer = serializer;
        self
    }

    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Arc::new(ids);
        self
    }

    /// Build a request with a fresh id, for use in [`Client::call_batch`]
    pub fn request(&self, method: impl Into<String>, params: Vec<Value>) -> JsonRpcRequest {
        JsonRpcRequest::new_with_params(self.ids.next_id(), method, params)
    }

    /// Call `method` with positional `params`. An error object in the
    /// response is returned as [`ClientError::Rpc`].
    pub async fn call(&self, method: &str, params: Vec<Value>) -> ClientResult<Value> {
        let request = self.request(method, params);
        debug!(method, id = ?request.id, "Calling remote method");

        let bytes = self
            .serializer
            .marshal(&request)
            .map_err(|source| ClientError::Encode {
                method: method.to_string(),
                source,
            })?;

        let response_bytes =
            self.transport
                .send(bytes)
                .await
                .map_err(|source| ClientError::Transport {
                    method: method.to_string(),
                    source,
                })?;

        let response: JsonRpcResponse = self
            .serializer
            .unmarshal(&response_bytes)
            .map_err(|source| ClientError::Decode {
                method: method.to_string(),
                source,
            })?;

        if response.id != request.id {
            warn!(method, sent = ?request.id, received = ?response.id, "Response id mismatch");
        }

        response.into_result().map_err(ClientError::Rpc)
    }

    /// Call `method` and deserialize its result into `T`
    pub async fn call_typed<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> ClientResult<T> {
        let result = self.call(method, params).await?;
        serde_json::from_value(result).map_err(|source| ClientError::Result {
            method: method.to_string(),
            source,
        })
    }

    /// Send `requests` as one batch. Responses come back in request order.
    /// A failure to encode, send or decode the batch as a whole yields a
    /// single error response.
    pub async fn call_batch(&self, requests: Vec<JsonRpcRequest>) -> Vec<JsonRpcResponse> {
        debug!(count = requests.len(), "Calling remote batch");

        let bytes = match self.serializer.marshal(&requests) {
            Ok(bytes) => bytes,
            Err(err) => {
                return batch_failure(JsonRpcError::invalid_request(format!(
                    "barrister: CallBatch unable to Marshal request: {}",
                    err
                )));
            }
        };

        let response_bytes = match self.transport.send(bytes).await {
            Ok(bytes) => bytes,
            Err(err) => {
                return batch_failure(JsonRpcError::internal_error(format!(
                    "barrister: CallBatch Transport error during request: {}",
                    err
                )));
            }
        };

        match self.serializer.unmarshal::<Vec<JsonRpcResponse>>(&response_bytes) {
            Ok(responses) => responses,
            Err(err) => batch_failure(JsonRpcError::internal_error(format!(
                "barrister: CallBatch unable to Unmarshal response: {}",
                err
            ))),
        }
    }

    /// Fetch the server's IDL through the `barrister-idl` method
    pub async fn fetch_contract(&self) -> ClientResult<Contract> {
        let elements = self.call(IDL_METHOD, Vec::new()).await?;
        let bytes = serde_json::to_vec(&elements).map_err(|source| ClientError::Result {
            method: IDL_METHOD.to_string(),
            source,
        })?;
        Ok(Contract::parse(&bytes)?)
    }
}

fn batch_failure(error: JsonRpcError) -> Vec<JsonRpcResponse> {
    warn!("Batch call failed: {}", error.message);
    vec![JsonRpcResponse::error(None, error)]
}
