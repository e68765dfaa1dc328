//! Error types for client operations

use barrister_idl::SchemaError;
use barrister_json_rpc::{JsonRpcError, JsonRpcErrorCode};
use thiserror::Error;

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Failure of a single client call
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("barrister: {method}: Call unable to Marshal request: {source}")]
    Encode {
        method: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("barrister: {method}: Transport error during request: {source}")]
    Transport {
        method: String,
        #[source]
        source: TransportError,
    },

    #[error("barrister: {method}: Call unable to Unmarshal response: {source}")]
    Decode {
        method: String,
        #[source]
        source: serde_json::Error,
    },

    /// The server answered with an error object
    #[error("{0}")]
    Rpc(JsonRpcError),

    #[error("barrister: {method}: unable to decode result: {source}")]
    Result {
        method: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("barrister: remote contract is invalid: {0}")]
    Contract(#[from] SchemaError),
}

impl ClientError {
    /// JSON-RPC code for this failure. Encoding failures count as invalid
    /// requests, everything on the way back as internal errors.
    pub fn code(&self) -> i64 {
        match self {
            ClientError::Encode { .. } => JsonRpcErrorCode::InvalidRequest.code(),
            ClientError::Rpc(err) => err.code,
            _ => JsonRpcErrorCode::InternalError.code(),
        }
    }

    /// Express the failure as a wire error object
    pub fn to_rpc_error(&self) -> JsonRpcError {
        match self {
            ClientError::Rpc(err) => err.clone(),
            other => JsonRpcError::application(other.code(), other.to_string()),
        }
    }
}

impl From<JsonRpcError> for ClientError {
    fn from(err: JsonRpcError) -> Self {
        ClientError::Rpc(err)
    }
}

/// Transport-specific errors
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("barrister: invalid endpoint URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("barrister: HttpTransport unable to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("barrister: HttpTransport POST to {url} failed: {source}")]
    Post {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("barrister: HttpTransport POST to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("barrister: HttpTransport Unable to read response body: {0}")]
    ReadBody(#[source] reqwest::Error),

    #[error("barrister: in-process dispatch failed: {0}")]
    Dispatch(String),
}
