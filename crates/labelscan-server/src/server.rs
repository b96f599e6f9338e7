//! HTTP server and routing.

use std::sync::Arc;

use anyhow::Result;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{middleware, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use labelscan_core::models::config::ServerConfig;
use labelscan_core::{ExtractionService, PersistenceForwarder};

use crate::handlers;
use crate::origin::{self, OriginPolicy};

/// Application state shared across routes.
#[derive(Clone)]
pub struct AppState {
    pub extraction: Arc<ExtractionService>,
    pub persistence: Arc<PersistenceForwarder>,
}

impl AppState {
    pub fn new(extraction: ExtractionService, persistence: PersistenceForwarder) -> Self {
        Self {
            extraction: Arc::new(extraction),
            persistence: Arc::new(persistence),
        }
    }
}

/// Build the API router.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let policy = Arc::new(OriginPolicy::new(&config.allowed_origins));

    Router::new()
        .route("/scanSerialNumber", post(handlers::scan_serial_number))
        .route("/saveSerialNumber", post(handlers::save_serial_number))
        .route("/health", get(handlers::health))
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(policy.cors_layer())
        .layer(middleware::from_fn_with_state(policy, origin::guard))
        .layer(TraceLayer::new_for_http())
}

/// Serve the API until ctrl-c.
pub async fn start_server(config: &ServerConfig, state: AppState) -> Result<()> {
    let app = build_router(state, config);
    let addr = format!("{}:{}", config.bind_address, config.port);

    let listener = TcpListener::bind(&addr).await?;
    info!(addr = %addr, origins = ?config.allowed_origins, "HTTP API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
