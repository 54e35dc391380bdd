//! HTTP surface
//!
//! Serves `GET /{url}` and `POST /{url}`, where `{url}` is the upstream
//! target with or without its scheme.

use crate::error::{Result, ServerError};
use crate::server::gateway::Gateway;
use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Default port for the gateway
pub const DEFAULT_HTTP_PORT: u16 = 8000;

/// Listener configuration for the gateway
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Address to bind to (e.g., "0.0.0.0:8000")
    pub bind: SocketAddr,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], DEFAULT_HTTP_PORT)),
        }
    }
}

impl HttpConfig {
    /// Create a new HTTP config with the specified bind address
    pub fn new(bind: SocketAddr) -> Self {
        Self { bind }
    }

    /// Create config from host and port; `localhost` binds the loopback address
    pub fn from_host_port(host: &str, port: u16) -> std::result::Result<Self, ServerError> {
        let ip: IpAddr = if host == "localhost" {
            Ipv4Addr::LOCALHOST.into()
        } else {
            host.parse()?
        };
        Ok(Self::new(SocketAddr::new(ip, port)))
    }
}

/// Build the gateway router
pub fn router(gateway: Arc<Gateway>) -> Router {
    Router::new()
        .fallback(proxy_handler)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(gateway)
}

async fn proxy_handler(
    State(gateway): State<Arc<Gateway>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Body,
) -> Response {
    if !matches!(method, Method::GET | Method::HEAD | Method::POST) {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }
    gateway.handle(method, uri, headers, body).await
}

/// Run the gateway until Ctrl+C
pub async fn run_gateway(gateway: Arc<Gateway>, config: HttpConfig) -> Result<()> {
    let listener = TcpListener::bind(config.bind)
        .await
        .map_err(ServerError::Io)?;
    let local = listener.local_addr().map_err(ServerError::Io)?;

    info!("Gateway listening on http://{}", local);
    info!("Press Ctrl+C to stop the server");

    axum::serve(listener, router(gateway))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Io)?;

    info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Received shutdown signal");
    }
}
