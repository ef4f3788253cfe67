//! Minimal health-check HTTP endpoint.
//!
//! `GET /health` answers `{"status":"ok"}`; every other path gets a
//! plain-text banner. Liveness only; no backend connectivity probing.

use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use tracing::info;

use crate::{BifrostError, Result};

/// Build the health router.
pub fn router() -> Router {
    Router::new().route("/health", get(health)).fallback(banner)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn banner() -> &'static str {
    "bifrost running"
}

/// Bind and serve the health endpoint until the process exits.
pub async fn serve(address: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(address).await.map_err(|e| {
        BifrostError::Configuration(format!("failed to bind health endpoint to {address}: {e}"))
    })?;
    info!(%address, "health endpoint listening");
    axum::serve(listener, router())
        .await
        .map_err(|e| BifrostError::Http(e.to_string()))
}
