//! # JSON-RPC 2.0 Envelopes for Barrister
//!
//! Transport-agnostic request, response and error envelopes exchanged by
//! Barrister servers and clients. Dispatch logic lives in `barrister-server`;
//! this crate only knows the wire shapes.
//!
//! ## Features
//! - Request envelopes whose `params` are either positional or a single value
//! - Response envelopes that always carry exactly one of `result` / `error`
//! - Standard error codes plus application-defined codes

pub mod error;
pub mod prelude;
pub mod request;
pub mod response;
pub mod types;

// Re-export main types
pub use error::{JsonRpcError, JsonRpcErrorCode};
pub use request::{JsonRpcRequest, RequestParams};
pub use response::{JsonRpcResponse, ResponsePayload};
pub use types::{JsonRpcVersion, RequestId};

/// JSON-RPC 2.0 version constant
pub const JSONRPC_VERSION: &str = "2.0";

/// Method name reserved for contract introspection
pub const IDL_METHOD: &str = "barrister-idl";

/// Standard JSON-RPC 2.0 error codes
pub mod error_codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;

    // Server error range: -32099 to -32000
    pub const SERVER_ERROR_START: i64 = -32099;
    pub const SERVER_ERROR_END: i64 = -32000;
}
