//! Data models for tsfm-meta

pub mod track;

pub use track::{CatalogTrack, TrackMetadata};
