//! # Barrister Server Prelude
//!
//! ```rust
//! use barrister_server::prelude::*;
//! ```

pub use crate::builder::ServerBuilder;
pub use crate::convert::Converter;
pub use crate::error::{ConvertError, RegistrationError, ServerBuildError};
pub use crate::handler::{Callable, DynamicFunction, Handler, IntoCallable, Signature};
pub use crate::registry::HandlerRegistry;
pub use crate::repr::{IdlType, TypeRepr};
pub use crate::server::Server;

pub use barrister_idl::Contract;
pub use barrister_json_rpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
