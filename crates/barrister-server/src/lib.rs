//! # Barrister Server
//!
//! Dispatches JSON-RPC requests to handlers that are checked against a
//! Barrister IDL contract.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use barrister_server::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let contract = Contract::parse(&std::fs::read("echo.json")?)?;
//!
//! let server = Server::builder(contract)
//!     .handler(
//!         "B",
//!         Handler::new().function("echo", |s: String| Ok::<_, JsonRpcError>(Some(s))),
//!     )
//!     .build()?;
//!
//! let response = server.invoke_json(br#"{"jsonrpc":"2.0","id":"1","method":"B.echo","params":["hi"]}"#);
//! println!("{}", String::from_utf8_lossy(&response));
//! # Ok(())
//! # }
//! ```
//!
//! Handlers are plain closures. Their argument and result types implement
//! [`IdlType`], which `#[derive(IdlType)]` from `barrister-derive` provides
//! for structs and unit enums. Registration fails when a closure's types
//! cannot hold the values the IDL declares.

pub mod builder;
pub mod convert;
pub mod error;
pub mod handler;
pub mod prelude;
pub mod registry;
pub mod repr;
pub mod server;

// Re-export main types
pub use builder::ServerBuilder;
pub use convert::Converter;
pub use error::{ConvertError, RegistrationError, RegistrationResult, ServerBuildError};
pub use handler::{Callable, DynamicFunction, Handler, IntoCallable, Signature, capitalize};
pub use registry::HandlerRegistry;
pub use repr::{IdlType, TypeRepr};
pub use server::{Server, parse_method};

// Re-export foundational types
pub use barrister_idl;
pub use barrister_json_rpc;
