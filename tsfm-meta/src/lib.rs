//! tsfm-meta library interface
//!
//! Resolves loosely formatted now-playing metadata to Spotify track records.
//! Exposes the resolver, its collaborators and the HTTP router for
//! integration testing.

pub mod api;
pub mod clock;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::services::TrackResolver;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Shared resolver (owns the token cache)
    pub resolver: Arc<TrackResolver>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last error for diagnostic purposes
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(resolver: Arc<TrackResolver>) -> Self {
        Self {
            resolver,
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Remember the most recent failure for `/health`
    pub async fn record_error(&self, message: String) {
        *self.last_error.write().await = Some(message);
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::search_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
