//! Router construction and listener lifecycle.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::routes::{extract_handler, root_handler, version_handler};
use crate::config::ServerConfig;
use crate::extract::dispatcher::Extractor;
use crate::utils::fetcher::DocumentFetcher;

/// Shared application state. Request handling never mutates it; the only
/// process-wide mutable piece is the PDF engine handle inside `extractor`.
#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<DocumentFetcher>,
    pub extractor: Extractor,
}

impl AppState {
    pub fn new(fetcher: DocumentFetcher, extractor: Extractor) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            extractor,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        let fetcher = DocumentFetcher::new(config)?;
        let extractor = Extractor::with_default_engines(config.engine_wait);
        Ok(Self::new(fetcher, extractor))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/_version", get(version_handler))
        .route("/extract", get(extract_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds `0.0.0.0:<port>` and serves until the process stops.
pub async fn serve(config: &ServerConfig, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .map_err(|e| anyhow!("Failed to bind port {}: {}", config.port, e))?;

    info!("Listening on http://0.0.0.0:{}/", config.port);
    info!("  - Extract: http://0.0.0.0:{}/extract?url=<document-url>", config.port);

    axum::serve(listener, router(state))
        .await
        .map_err(|e| anyhow!("Server error: {}", e))?;

    Ok(())
}
