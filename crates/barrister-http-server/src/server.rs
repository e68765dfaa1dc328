//! HTTP server hosting a Barrister dispatcher on one POST endpoint

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use barrister_server::Server;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::Result;
use crate::handler::RpcHttpHandler;

/// Configuration for the HTTP server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_address: SocketAddr,
    /// Path for the RPC endpoint
    pub rpc_path: String,
    /// Maximum request body size
    pub max_body_size: usize,
    /// Enable CORS
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 8000)),
            rpc_path: "/rpc".to_string(),
            max_body_size: 1024 * 1024, // 1MB
            enable_cors: true,
        }
    }
}

/// Builder for [`HttpServer`]
pub struct HttpServerBuilder {
    config: ServerConfig,
    server: Server,
}

impl HttpServerBuilder {
    /// Create a builder around a fully registered dispatcher
    pub fn new(server: Server) -> Self {
        Self {
            config: ServerConfig::default(),
            server,
        }
    }

    /// Set the bind address
    pub fn bind_address(mut self, addr: SocketAddr) -> Self {
        self.config.bind_address = addr;
        self
    }

    /// Set the RPC endpoint path
    pub fn rpc_path(mut self, path: impl Into<String>) -> Self {
        self.config.rpc_path = path.into();
        self
    }

    /// Enable or disable CORS
    pub fn cors(mut self, enable: bool) -> Self {
        self.config.enable_cors = enable;
        self
    }

    /// Set maximum request body size
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.config.max_body_size = size;
        self
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> HttpServer {
        HttpServer {
            config: Arc::new(self.config),
            server: Arc::new(self.server),
        }
    }
}

/// HTTP server for Barrister RPC
#[derive(Clone)]
pub struct HttpServer {
    config: Arc<ServerConfig>,
    server: Arc<Server>,
}

impl HttpServer {
    /// Create a new builder
    pub fn builder(server: Server) -> HttpServerBuilder {
        HttpServerBuilder::new(server)
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// The dispatcher behind the endpoint
    pub fn server(&self) -> &Arc<Server> {
        &self.server
    }

    /// Bind the configured address and serve until the process exits
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(&self.config.bind_address).await?;
        self.serve(listener).await
    }

    /// Serve connections from an already bound listener
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        self.serve_with_shutdown(listener, std::future::pending::<()>())
            .await
    }

    /// Serve connections until `signal` completes. In-flight connections
    /// are left to finish on their own tasks.
    pub async fn serve_with_shutdown<F>(&self, listener: TcpListener, signal: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let local_addr = listener.local_addr()?;
        info!("Barrister HTTP server listening on {}", local_addr);
        info!("RPC endpoint available at: {}", self.config.rpc_path);

        let handler = RpcHttpHandler::new(Arc::clone(&self.config), Arc::clone(&self.server));
        tokio::pin!(signal);

        loop {
            let (stream, peer_addr) = tokio::select! {
                accepted = listener.accept() => accepted?,
                _ = &mut signal => {
                    info!("Shutting down HTTP server on {}", local_addr);
                    return Ok(());
                }
            };
            debug!("New connection from {}", peer_addr);

            let handler = handler.clone();
            tokio::spawn(async move {
                let io = TokioIo::new(stream);
                let service = service_fn(move |req| {
                    let handler = handler.clone();
                    async move { Ok::<_, Infallible>(handler.handle(req).await) }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    let err_str = err.to_string();
                    if err_str.contains("connection closed before message completed") {
                        debug!("Client disconnected (normal): {}", err);
                    } else {
                        error!("Error serving connection: {}", err);
                    }
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use barrister_server::prelude::Contract;

    fn create_test_server() -> Server {
        let contract =
            Contract::parse(include_bytes!("../../../tests/fixtures/conform.json")).unwrap();
        Server::new(contract)
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_address.port(), 8000);
        assert_eq!(config.rpc_path, "/rpc");
        assert_eq!(config.max_body_size, 1024 * 1024);
        assert!(config.enable_cors);
    }

    #[test]
    fn test_builder_setters() {
        let server = HttpServer::builder(create_test_server())
            .bind_address("0.0.0.0:9090".parse().unwrap())
            .rpc_path("/api")
            .cors(false)
            .max_body_size(512)
            .build();

        assert_eq!(server.config().bind_address.port(), 9090);
        assert_eq!(server.config().rpc_path, "/api");
        assert!(!server.config().enable_cors);
        assert_eq!(server.config().max_body_size, 512);
    }

    #[tokio::test]
    async fn test_shutdown_signal_stops_accept_loop() {
        let server = HttpServer::builder(create_test_server()).build();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();

        let result = server.serve_with_shutdown(listener, async {}).await;
        assert!(result.is_ok());
    }
}
