//! Track records: catalog candidates and the public result shape

use serde::{Deserialize, Serialize};

/// A single track record returned by the catalog for one query
///
/// Built fresh per search call and never merged across queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogTrack {
    pub title: String,
    /// Credited performers in catalog order
    pub artists: Vec<String>,
    pub album: Option<String>,
    /// Album art URLs in catalog order (largest first for Spotify)
    pub images: Vec<String>,
    pub release_date: Option<String>,
    pub external_url: Option<String>,
    pub duration_ms: Option<u64>,
    pub preview_url: Option<String>,
}

impl CatalogTrack {
    /// Comma-joined performer list, order preserved
    pub fn joined_artists(&self) -> String {
        self.artists.join(", ")
    }
}

/// Normalized metadata returned to callers of the resolver
///
/// Field names match the JSON served by `POST /api/spotify/search`. A
/// default value (every field `None`) is what the HTTP surface returns when
/// nothing matched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackMetadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    /// Largest image (first in the catalog list)
    pub album_art_url: Option<String>,
    /// Smallest image (last in the catalog list)
    pub album_art_small: Option<String>,
    /// Second image, or the largest when fewer than two exist
    pub album_art_medium: Option<String>,
    pub release_date: Option<String>,
    pub spotify_url: Option<String>,
    pub duration_ms: Option<u64>,
    pub preview_url: Option<String>,
}

impl From<CatalogTrack> for TrackMetadata {
    fn from(track: CatalogTrack) -> Self {
        let artist = track.joined_artists();
        let album_art_url = track.images.first().cloned();
        let album_art_small = track.images.last().cloned();
        let album_art_medium = track
            .images
            .get(1)
            .cloned()
            .or_else(|| album_art_url.clone());

        Self {
            title: Some(track.title),
            artist: Some(artist),
            album: track.album,
            album_art_url,
            album_art_small,
            album_art_medium,
            release_date: track.release_date,
            spotify_url: track.external_url,
            duration_ms: track.duration_ms,
            preview_url: track.preview_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track_with_images(images: &[&str]) -> CatalogTrack {
        CatalogTrack {
            title: "Get Lucky".to_string(),
            artists: vec![
                "Daft Punk".to_string(),
                "Pharrell Williams".to_string(),
                "Nile Rodgers".to_string(),
            ],
            album: Some("Random Access Memories".to_string()),
            images: images.iter().map(|s| s.to_string()).collect(),
            release_date: Some("2013-05-17".to_string()),
            external_url: Some("https://open.spotify.com/track/abc".to_string()),
            duration_ms: Some(369_626),
            preview_url: None,
        }
    }

    #[test]
    fn test_three_images_map_largest_medium_smallest() {
        let meta = TrackMetadata::from(track_with_images(&["640", "300", "64"]));
        assert_eq!(meta.album_art_url.as_deref(), Some("640"));
        assert_eq!(meta.album_art_medium.as_deref(), Some("300"));
        assert_eq!(meta.album_art_small.as_deref(), Some("64"));
    }

    #[test]
    fn test_single_image_fills_every_slot() {
        let meta = TrackMetadata::from(track_with_images(&["640"]));
        assert_eq!(meta.album_art_url.as_deref(), Some("640"));
        assert_eq!(meta.album_art_medium.as_deref(), Some("640"));
        assert_eq!(meta.album_art_small.as_deref(), Some("640"));
    }

    #[test]
    fn test_no_images() {
        let meta = TrackMetadata::from(track_with_images(&[]));
        assert!(meta.album_art_url.is_none());
        assert!(meta.album_art_medium.is_none());
        assert!(meta.album_art_small.is_none());
    }

    #[test]
    fn test_artists_joined_in_catalog_order() {
        let meta = TrackMetadata::from(track_with_images(&[]));
        assert_eq!(
            meta.artist.as_deref(),
            Some("Daft Punk, Pharrell Williams, Nile Rodgers")
        );
        assert_eq!(meta.spotify_url.as_deref(), Some("https://open.spotify.com/track/abc"));
        assert_eq!(meta.duration_ms, Some(369_626));
    }

    #[test]
    fn test_empty_result_serializes_nulls() {
        let json = serde_json::to_value(TrackMetadata::default()).unwrap();
        assert!(json["title"].is_null());
        assert!(json["album_art_url"].is_null());
        assert!(json["spotify_url"].is_null());
    }
}
