//! HTTP request handler feeding POST bodies into the dispatcher

use std::sync::Arc;

use barrister_server::Server;
use bytes::Bytes;
use http::header::{ALLOW, CONTENT_TYPE, HeaderValue};
use http::{Method, Request, Response, StatusCode};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Body;
use tracing::{debug, error, warn};

use crate::cors::CorsLayer;
use crate::server::ServerConfig;

/// Routes HTTP requests for one RPC endpoint
#[derive(Clone)]
pub struct RpcHttpHandler {
    config: Arc<ServerConfig>,
    server: Arc<Server>,
}

impl RpcHttpHandler {
    pub fn new(config: Arc<ServerConfig>, server: Arc<Server>) -> Self {
        Self { config, server }
    }

    /// Handle one HTTP request. Every outcome is a response; JSON-RPC
    /// failures are reported inside a 200 body.
    pub async fn handle<B>(&self, req: Request<B>) -> Response<Full<Bytes>>
    where
        B: Body,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let path = req.uri().path().to_string();
        debug!("Handling {} {}", req.method(), path);

        let mut response = if path != self.config.rpc_path {
            plain(StatusCode::NOT_FOUND, "Not Found")
        } else {
            match *req.method() {
                Method::POST => self.handle_rpc(req).await,
                Method::OPTIONS if self.config.enable_cors => empty(StatusCode::NO_CONTENT),
                _ => method_not_allowed(),
            }
        };

        if self.config.enable_cors {
            CorsLayer::apply_cors_headers(response.headers_mut());
        }
        response
    }

    async fn handle_rpc<B>(&self, req: Request<B>) -> Response<Full<Bytes>>
    where
        B: Body,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .unwrap_or("");
        if !content_type.starts_with("application/json") {
            debug!("Accepting body with content type {:?}", content_type);
        }

        let limit = self.config.max_body_size;
        let body = match Limited::new(req.into_body(), limit).collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(err) if err.downcast_ref::<LengthLimitError>().is_some() => {
                warn!("Request body exceeds {} bytes", limit);
                return plain(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large");
            }
            Err(err) => {
                error!("Failed to read request body: {}", err);
                return plain(StatusCode::BAD_REQUEST, "Failed to read request body");
            }
        };

        // Handlers are synchronous, keep them off the reactor threads
        let server = Arc::clone(&self.server);
        match tokio::task::spawn_blocking(move || server.invoke_json(&body)).await {
            Ok(output) => json(output),
            Err(err) => {
                error!("Dispatch task failed: {}", err);
                plain(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
        }
    }
}

fn json(body: Vec<u8>) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(body)));
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

fn plain(status: StatusCode, message: &'static str) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from_static(message.as_bytes())));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    response
}

fn empty(status: StatusCode) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = status;
    response
}

fn method_not_allowed() -> Response<Full<Bytes>> {
    let mut response = plain(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed");
    response
        .headers_mut()
        .insert(ALLOW, HeaderValue::from_static("POST"));
    response
}
