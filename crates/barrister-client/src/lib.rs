//! # Barrister Client
//!
//! Calls Barrister RPC services. A [`Client`] encodes JSON-RPC requests with
//! a [`JsonSerializer`], hands the bytes to a [`Transport`] and decodes what
//! comes back. [`HttpTransport`] POSTs to a remote endpoint and
//! [`InProcessTransport`] dispatches into a local
//! [`barrister_server::Server`].
//!
//! ```rust,no_run
//! use barrister_client::Client;
//! use serde_json::json;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::http("http://127.0.0.1:9233/rpc")?;
//!
//! let echoed: Option<String> = client.call_typed("B.echo", vec![json!("hello")]).await?;
//! assert_eq!(echoed.as_deref(), Some("hello"));
//!
//! let contract = client.fetch_contract().await?;
//! println!("{:?}", contract.interface_names().collect::<Vec<_>>());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod id;
pub mod prelude;
pub mod serializer;
pub mod transport;

pub use client::Client;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult, TransportError};
pub use id::{IdGenerator, RandomIdGenerator, SequentialIdGenerator};
pub use serializer::{JsonSerializer, encode_ascii};
pub use transport::{HttpTransport, InProcessTransport, Transport};

pub use barrister_json_rpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
