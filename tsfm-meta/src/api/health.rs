//! Health check and service info endpoints

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status ("ok", or "degraded" when credentials are missing)
    pub status: String,
    /// Module name ("tsfm-meta")
    pub module: String,
    /// Crate version from Cargo.toml
    pub version: String,
    /// Seconds since service started
    pub uptime_seconds: u64,
    /// Whether Spotify client credentials were found at startup
    pub credentials_configured: bool,
    /// Last resolution error if any (for diagnostics)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime = Utc::now().signed_duration_since(state.startup_time);
    let uptime_seconds = uptime.num_seconds().max(0) as u64;

    let last_error = state.last_error.read().await.clone();
    let credentials_configured = state.resolver.is_configured();

    Json(HealthResponse {
        status: if credentials_configured { "ok" } else { "degraded" }.to_string(),
        module: "tsfm-meta".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds,
        credentials_configured,
        last_error,
    })
}

/// GET /api/
pub async fn api_root() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "TruckSimFM metadata API is running",
    }))
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/api", get(api_root))
        .route("/api/", get(api_root))
}
