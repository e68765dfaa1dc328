//! # Barrister Client Prelude
//!
//! ```rust
//! use barrister_client::prelude::*;
//! ```

pub use crate::client::Client;
pub use crate::config::ClientConfig;
pub use crate::error::{ClientError, ClientResult, TransportError};
pub use crate::id::{IdGenerator, RandomIdGenerator, SequentialIdGenerator};
pub use crate::serializer::JsonSerializer;
pub use crate::transport::{HttpTransport, InProcessTransport, Transport};

pub use barrister_json_rpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
