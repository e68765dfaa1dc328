use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::JsonRpcError;
use crate::types::{JsonRpcVersion, RequestId};

/// Outcome carried by a response: exactly one of `result` or `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponsePayload {
    /// Success, including a `null` result from a void or optional return
    Result(Value),
    Error(JsonRpcError),
}

/// A JSON-RPC response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(rename = "jsonrpc", default)]
    pub version: JsonRpcVersion,
    /// Echoes the request id; `null` when the request could not be decoded
    #[serde(default)]
    pub id: Option<RequestId>,
    #[serde(flatten)]
    pub payload: ResponsePayload,
}

impl JsonRpcResponse {
    pub fn new(id: Option<RequestId>, payload: ResponsePayload) -> Self {
        Self {
            version: JsonRpcVersion::V2_0,
            id,
            payload,
        }
    }

    pub fn success(id: Option<RequestId>, result: Value) -> Self {
        Self::new(id, ResponsePayload::Result(result))
    }

    pub fn error(id: Option<RequestId>, error: JsonRpcError) -> Self {
        Self::new(id, ResponsePayload::Error(error))
    }

    /// Build from the outcome of a call
    pub fn from_outcome(id: Option<RequestId>, outcome: Result<Value, JsonRpcError>) -> Self {
        match outcome {
            Ok(result) => Self::success(id, result),
            Err(error) => Self::error(id, error),
        }
    }

    /// Check if this is an error response
    pub fn is_error(&self) -> bool {
        matches!(self.payload, ResponsePayload::Error(_))
    }

    pub fn result(&self) -> Option<&Value> {
        match &self.payload {
            ResponsePayload::Result(value) => Some(value),
            ResponsePayload::Error(_) => None,
        }
    }

    pub fn error_object(&self) -> Option<&JsonRpcError> {
        match &self.payload {
            ResponsePayload::Result(_) => None,
            ResponsePayload::Error(error) => Some(error),
        }
    }

    pub fn into_result(self) -> Result<Value, JsonRpcError> {
        match self.payload {
            ResponsePayload::Result(value) => Ok(value),
            ResponsePayload::Error(error) => Err(error),
        }
    }
}
