//! Shared E2E Test Utilities
//!
//! Starts a Barrister HTTP server inside the test process and talks to it
//! with raw HTTP requests.

use std::net::SocketAddr;

use barrister_http_server::{HttpServer, ServerConfig};
use barrister_server::Server;
use reqwest::Client;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Raw HTTP client for one RPC endpoint
#[derive(Clone)]
pub struct RpcTestClient {
    client: Client,
    url: String,
}

impl RpcTestClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }

    /// POST a JSON-RPC request and decode the JSON response body
    pub async fn make_request(
        &self,
        method: &str,
        params: Value,
        id: &str,
    ) -> Result<Value, reqwest::Error> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params
        });
        self.post_json(&request).await
    }

    pub async fn post_json(&self, body: &Value) -> Result<Value, reqwest::Error> {
        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;
        response.json().await
    }

    /// POST arbitrary bytes and return the raw response
    pub async fn post_raw(&self, body: impl Into<Vec<u8>>) -> Result<reqwest::Response, reqwest::Error> {
        self.client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .body(body.into())
            .send()
            .await
    }

    pub fn http(&self) -> &Client {
        &self.client
    }
}

/// In-process HTTP server for E2E tests, stopped on drop
pub struct TestServerManager {
    addr: SocketAddr,
    rpc_path: String,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl TestServerManager {
    /// Serve `server` with default settings on a free local port
    pub async fn start(server: Server) -> Result<Self, Box<dyn std::error::Error>> {
        Self::start_with_config(server, ServerConfig::default()).await
    }

    /// Serve `server` on a free local port; `config.bind_address` is ignored
    pub async fn start_with_config(
        server: Server,
        config: ServerConfig,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let port = portpicker::pick_unused_port().ok_or("No available port")?;
        let addr = SocketAddr::from(([127, 0, 0, 1], port));
        let listener = TcpListener::bind(addr).await?;
        info!("Starting test server on {}", addr);

        let rpc_path = config.rpc_path.clone();
        let http = HttpServer::builder(server)
            .config(ServerConfig {
                bind_address: addr,
                ..config
            })
            .build();

        let (shutdown, signal) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let stopped = async {
                let _ = signal.await;
            };
            if let Err(err) = http.serve_with_shutdown(listener, stopped).await {
                debug!("Test server stopped with error: {}", err);
            }
        });

        Ok(Self {
            addr,
            rpc_path,
            shutdown: Some(shutdown),
            task,
        })
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Full URL of the RPC endpoint
    pub fn rpc_url(&self) -> String {
        format!("{}{}", self.base_url(), self.rpc_path)
    }

    pub fn client(&self) -> RpcTestClient {
        RpcTestClient::new(self.rpc_url())
    }
}

impl Drop for TestServerManager {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        self.task.abort();
    }
}
