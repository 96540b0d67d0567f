//! Spotify Web API search client
//!
//! Issues `GET <api_base>/search?q=..&type=track&limit=n` with a bearer token
//! and maps the nested response into `CatalogTrack` candidates.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tsfm_common::config::CatalogConfig;

use crate::models::CatalogTrack;

/// Catalog client errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Transport failure or timeout
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Bearer token rejected (HTTP 401)
    #[error("Catalog rejected access token")]
    Unauthorized,

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Track search against the catalog
#[async_trait]
pub trait CatalogSearch: Send + Sync {
    /// Run one search; returns at most `limit` candidates in catalog order
    async fn search_tracks(
        &self,
        query: &str,
        limit: u8,
        token: &str,
    ) -> Result<Vec<CatalogTrack>, CatalogError>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    tracks: Option<TrackPage>,
}

#[derive(Debug, Deserialize)]
struct TrackPage {
    #[serde(default)]
    items: Vec<Option<ApiTrack>>,
}

#[derive(Debug, Deserialize)]
struct ApiTrack {
    name: String,
    #[serde(default)]
    artists: Vec<ApiArtist>,
    #[serde(default)]
    album: Option<ApiAlbum>,
    #[serde(default)]
    external_urls: Option<ApiExternalUrls>,
    #[serde(default)]
    duration_ms: Option<u64>,
    #[serde(default)]
    preview_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiArtist {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ApiAlbum {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    images: Vec<ApiImage>,
    #[serde(default)]
    release_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiImage {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ApiExternalUrls {
    #[serde(default)]
    spotify: Option<String>,
}

impl From<ApiTrack> for CatalogTrack {
    fn from(track: ApiTrack) -> Self {
        let (album, images, release_date) = match track.album {
            Some(album) => (
                album.name,
                album.images.into_iter().map(|i| i.url).collect(),
                album.release_date,
            ),
            None => (None, Vec::new(), None),
        };

        CatalogTrack {
            title: track.name,
            artists: track.artists.into_iter().map(|a| a.name).collect(),
            album,
            images,
            release_date,
            external_url: track.external_urls.and_then(|u| u.spotify),
            duration_ms: track.duration_ms,
            preview_url: track.preview_url,
        }
    }
}

/// Map a raw search response body into candidates
pub fn parse_search_response(body: &str) -> Result<Vec<CatalogTrack>, CatalogError> {
    let response: SearchResponse =
        serde_json::from_str(body).map_err(|e| CatalogError::ParseError(e.to_string()))?;

    Ok(response
        .tracks
        .map(|page| page.items.into_iter().flatten().map(CatalogTrack::from).collect())
        .unwrap_or_default())
}

/// Spotify search client
pub struct HttpCatalogClient {
    http_client: reqwest::Client,
    search_url: String,
}

impl HttpCatalogClient {
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CatalogError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            search_url: format!("{}/search", config.api_base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl CatalogSearch for HttpCatalogClient {
    async fn search_tracks(
        &self,
        query: &str,
        limit: u8,
        token: &str,
    ) -> Result<Vec<CatalogTrack>, CatalogError> {
        tracing::debug!(query = %query, limit = limit, "Querying Spotify search API");

        let limit = limit.to_string();
        let response = self
            .http_client
            .get(&self.search_url)
            .bearer_auth(token)
            .query(&[("q", query), ("type", "track"), ("limit", limit.as_str())])
            .send()
            .await
            .map_err(|e| CatalogError::NetworkError(e.to_string()))?;

        let status = response.status();

        if status == 401 {
            return Err(CatalogError::Unauthorized);
        }

        if status == 429 {
            return Err(CatalogError::RateLimitExceeded);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CatalogError::ApiError(status.as_u16(), error_text));
        }

        let body = response
            .text()
            .await
            .map_err(|e| CatalogError::NetworkError(e.to_string()))?;

        let tracks = parse_search_response(&body)?;

        tracing::debug!(query = %query, results = tracks.len(), "Spotify search returned");

        Ok(tracks)
    }
}
