//! Transport layer for the Barrister client

use async_trait::async_trait;

use crate::error::TransportError;

pub mod http;
pub mod in_process;

pub use http::HttpTransport;
pub use in_process::InProcessTransport;

/// Moves encoded request bytes to a server and returns the raw response bytes
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Vec<u8>) -> Result<Vec<u8>, TransportError>;
}
