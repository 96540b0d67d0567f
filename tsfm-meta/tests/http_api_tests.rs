//! HTTP surface tests
//!
//! Exercises the router in-process with `tower::ServiceExt::oneshot`.

mod helpers;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use helpers::{get_lucky, harness, IssuerMode};
use tsfm_meta::models::CatalogTrack;
use tsfm_meta::services::CatalogError;
use tsfm_meta::{build_router, AppState};

type ScriptedResponse = Result<Vec<CatalogTrack>, CatalogError>;

fn app_state(responses: Vec<ScriptedResponse>, mode: IssuerMode) -> AppState {
    let h = harness(responses, mode);
    AppState::new(Arc::new(h.resolver))
}

async fn send(state: AppState, request: Request<Body>) -> (StatusCode, Value) {
    let response = build_router(state).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_search_returns_track_metadata() {
    let state = app_state(vec![Ok(vec![get_lucky()])], IssuerMode::Succeed(3600));

    let (status, body) = send(
        state,
        post_json(
            "/api/spotify/search",
            json!({"artist": "Daft Punk", "title": "Get Lucky (feat. Pharrell Williams)"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Get Lucky");
    assert_eq!(body["artist"], "Daft Punk, Pharrell Williams, Nile Rodgers");
    assert_eq!(body["album_art_url"], "https://i.scdn.co/image/large");
    assert_eq!(body["album_art_medium"], "https://i.scdn.co/image/medium");
    assert_eq!(body["album_art_small"], "https://i.scdn.co/image/small");
    assert!(body["spotify_url"].is_string());
}

#[tokio::test]
async fn test_search_without_match_returns_empty_shape() {
    let state = app_state(vec![], IssuerMode::Succeed(3600));

    let (status, body) = send(
        state,
        post_json("/api/spotify/search", json!({"artist": "Nobody", "title": "Nothing"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["title"].is_null());
    assert!(body["artist"].is_null());
    assert!(body["album_art_url"].is_null());
}

#[tokio::test]
async fn test_search_with_missing_fields_returns_empty_shape() {
    let state = app_state(vec![Ok(vec![get_lucky()])], IssuerMode::Succeed(3600));

    let request = post_json("/api/spotify/search", json!({"artist": "Daft Punk"}));
    let (status, body) = send(state, request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["title"].is_null());
}

#[tokio::test]
async fn test_search_without_credentials_is_server_error() {
    let state = app_state(vec![], IssuerMode::Unconfigured);

    let (status, body) = send(
        state.clone(),
        post_json("/api/spotify/search", json!({"artist": "Daft Punk", "title": "Get Lucky"})),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "CONFIGURATION_ERROR");

    let (status, health) = send(state, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "degraded");
    assert_eq!(health["credentials_configured"], false);
    assert!(health["last_error"].is_string());
}

#[tokio::test]
async fn test_search_with_rejected_credentials() {
    let state = app_state(vec![], IssuerMode::Reject);

    let (status, body) = send(
        state,
        post_json("/api/spotify/search", json!({"artist": "Daft Punk", "title": "Get Lucky"})),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "AUTHENTICATION_ERROR");
}

#[tokio::test]
async fn test_search_raw_splits_now_playing_line() {
    let state = app_state(vec![Ok(vec![get_lucky()])], IssuerMode::Succeed(3600));

    let (status, body) = send(
        state,
        post_json("/api/spotify/search-raw", json!({"song": "Daft Punk - Get Lucky"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Get Lucky");
}

#[tokio::test]
async fn test_search_raw_rejects_unparseable_line() {
    let state = app_state(vec![], IssuerMode::Succeed(3600));

    let (status, body) = send(
        state,
        post_json("/api/spotify/search-raw", json!({"song": "TruckSimFM Live Radio"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_health_when_configured() {
    let state = app_state(vec![], IssuerMode::Succeed(3600));

    let (status, body) = send(state, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "tsfm-meta");
    assert_eq!(body["credentials_configured"], true);
    assert!(body.get("last_error").is_none());
}

#[tokio::test]
async fn test_api_root() {
    let state = app_state(vec![], IssuerMode::Succeed(3600));

    let (status, body) = send(state, get("/api/")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
