//! HTTP API handlers for tsfm-meta

pub mod health;
pub mod search;

pub use health::health_routes;
pub use search::search_routes;
