//! # Barrister HTTP Server
//!
//! Serves a [`barrister_server::Server`] over HTTP. Requests are `POST`ed to a
//! single endpoint with a JSON-RPC body, which is handed to the dispatcher
//! unchanged; the dispatcher's output is returned with status 200 whether it
//! carries results or errors.
//!
//! Other methods get 405, other paths 404 and bodies over the configured
//! limit 413.
//!
//! ```rust,no_run
//! use barrister_http_server::HttpServer;
//! use barrister_server::prelude::*;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let contract = Contract::parse(&std::fs::read("conform.json")?)?;
//! let mut server = Server::new(contract);
//! server.register(
//!     "B",
//!     Handler::new().function("echo", |s: String| Ok::<_, JsonRpcError>(Some(s))),
//! )?;
//!
//! HttpServer::builder(server)
//!     .bind_address("127.0.0.1:9233".parse()?)
//!     .build()
//!     .run()
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod cors;
pub mod handler;
pub mod server;

pub use cors::CorsLayer;
pub use handler::RpcHttpHandler;
pub use server::{HttpServer, HttpServerBuilder, ServerConfig};

/// Result type for HTTP server operations
pub type Result<T> = std::result::Result<T, HttpServerError>;

/// HTTP server errors
#[derive(Debug, thiserror::Error)]
pub enum HttpServerError {
    #[error("HTTP error: {0}")]
    Http(#[from] hyper::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
