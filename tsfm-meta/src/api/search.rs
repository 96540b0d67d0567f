//! Track metadata search endpoints
//!
//! `POST /api/spotify/search` takes an already split (artist, title) pair;
//! `POST /api/spotify/search-raw` takes the station's "Artist - Title" line.
//! Both answer with `TrackMetadata`, all fields null when nothing matched.

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::models::TrackMetadata;
use crate::services::parse_song_string;
use crate::AppState;

/// POST /api/spotify/search request body
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub title: String,
}

/// POST /api/spotify/search-raw request body
#[derive(Debug, Deserialize)]
pub struct RawSearchRequest {
    pub song: String,
}

/// POST /api/spotify/search
pub async fn search_track(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> ApiResult<Json<TrackMetadata>> {
    resolve_pair(&state, &request.artist, &request.title).await
}

/// POST /api/spotify/search-raw
pub async fn search_track_raw(
    State(state): State<AppState>,
    Json(request): Json<RawSearchRequest>,
) -> ApiResult<Json<TrackMetadata>> {
    let (artist, title) = parse_song_string(&request.song).ok_or_else(|| {
        ApiError::BadRequest(format!(
            "Could not split now-playing line into artist and title: {:?}",
            request.song
        ))
    })?;

    resolve_pair(&state, &artist, &title).await
}

async fn resolve_pair(
    state: &AppState,
    artist: &str,
    title: &str,
) -> ApiResult<Json<TrackMetadata>> {
    match state.resolver.resolve(artist, title).await {
        Ok(found) => Ok(Json(found.unwrap_or_default())),
        Err(e) => {
            tracing::error!(error = %e, "Error in Spotify search endpoint");
            state.record_error(e.to_string()).await;
            Err(e.into())
        }
    }
}

/// Build search routes
pub fn search_routes() -> Router<AppState> {
    Router::new()
        .route("/api/spotify/search", post(search_track))
        .route("/api/spotify/search-raw", post(search_track_raw))
}
