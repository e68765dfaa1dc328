//! # JSON-RPC Prelude
//!
//! Convenient re-exports of the envelope types.
//!
//! ```rust
//! use barrister_json_rpc::prelude::*;
//! ```

pub use crate::error::{JsonRpcError, JsonRpcErrorCode};
pub use crate::request::{JsonRpcRequest, RequestParams};
pub use crate::response::{JsonRpcResponse, ResponsePayload};
pub use crate::types::{JsonRpcVersion, RequestId};
pub use crate::{IDL_METHOD, JSONRPC_VERSION};

// Standard error codes
pub use crate::error_codes::*;
