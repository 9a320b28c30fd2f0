//! The HTTP surface: one enhancement endpoint plus history and health.

pub mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::http::{Method, header};
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::audit::AuditLog;
use crate::enhancer::EnhanceService;

/// Where the server listens.
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Shared state handed to every handler.
pub struct ApiState {
    pub service: EnhanceService,
    pub audit: Arc<dyn AuditLog>,
}

/// Build the router. CORS is wide open on purpose: the browser-extension
/// and editor surfaces originate from non-web contexts, and preflights
/// must get a 200 with the permissive headers.
pub fn router(state: Arc<ApiState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/api/enhance", post(handlers::enhance))
        .route("/api/history", get(handlers::history))
        .route("/health", get(handlers::health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(config: ServerConfig, state: Arc<ApiState>) -> Result<()> {
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", config.host, config.port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("burnish API listening on {addr}");

    axum::serve(listener, app)
        .await
        .context("enhancement server exited")?;
    Ok(())
}
