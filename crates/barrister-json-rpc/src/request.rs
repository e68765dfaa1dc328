use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::types::{JsonRpcVersion, RequestId};

/// Parameters for a JSON-RPC request
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RequestParams {
    /// Positional parameters as an array
    Positional(Vec<Value>),
    /// Any other value, passed to the method as its only argument
    Single(Value),
}

impl RequestParams {
    /// Get a positional parameter by index
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        match self {
            RequestParams::Positional(vec) => vec.get(index),
            RequestParams::Single(value) if index == 0 => Some(value),
            RequestParams::Single(_) => None,
        }
    }

    /// Number of arguments these params spread into
    pub fn len(&self) -> usize {
        match self {
            RequestParams::Positional(vec) => vec.len(),
            RequestParams::Single(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Spread into positional arguments: arrays become their elements, any
    /// other value becomes a single argument.
    pub fn into_positional(self) -> Vec<Value> {
        match self {
            RequestParams::Positional(vec) => vec,
            RequestParams::Single(value) => vec![value],
        }
    }

    /// Convert to a serde_json::Value for serialization
    pub fn to_value(&self) -> Value {
        match self {
            RequestParams::Positional(arr) => Value::Array(arr.clone()),
            RequestParams::Single(value) => value.clone(),
        }
    }
}

impl From<Vec<Value>> for RequestParams {
    fn from(vec: Vec<Value>) -> Self {
        RequestParams::Positional(vec)
    }
}

impl From<Value> for RequestParams {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(vec) => RequestParams::Positional(vec),
            other => RequestParams::Single(other),
        }
    }
}

// Only invoked when the key is present, so an explicit `null` stays a value.
fn present_params<'de, D>(deserializer: D) -> Result<Option<RequestParams>, D::Error>
where
    D: Deserializer<'de>,
{
    RequestParams::deserialize(deserializer).map(Some)
}

/// A JSON-RPC request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(rename = "jsonrpc", default)]
    pub version: JsonRpcVersion,
    #[serde(default)]
    pub id: Option<RequestId>,
    pub method: String,
    #[serde(
        default,
        deserialize_with = "present_params",
        skip_serializing_if = "Option::is_none"
    )]
    pub params: Option<RequestParams>,
}

impl JsonRpcRequest {
    pub fn new(id: impl Into<RequestId>, method: impl Into<String>, params: Option<RequestParams>) -> Self {
        Self {
            version: JsonRpcVersion::V2_0,
            id: Some(id.into()),
            method: method.into(),
            params,
        }
    }

    /// Create a new request with no parameters
    pub fn new_no_params(id: impl Into<RequestId>, method: impl Into<String>) -> Self {
        Self::new(id, method, None)
    }

    /// Create a new request with positional parameters
    pub fn new_with_params(id: impl Into<RequestId>, method: impl Into<String>, params: Vec<Value>) -> Self {
        Self::new(id, method, Some(RequestParams::Positional(params)))
    }

    /// Get a parameter by index
    pub fn get_param_index(&self, index: usize) -> Option<&Value> {
        self.params.as_ref()?.get_index(index)
    }

    /// Positional arguments for dispatch; absent params mean no arguments.
    pub fn positional_params(&self) -> Vec<Value> {
        self.params
            .clone()
            .map(RequestParams::into_positional)
            .unwrap_or_default()
    }
}
