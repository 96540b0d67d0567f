//! Shared test doubles for tsfm-meta integration tests
//!
//! - `ScriptedCatalog`: replays queued search results and records every query
//! - `StubIssuer`: counts credential exchanges, optionally failing

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tsfm_meta::clock::ManualClock;
use tsfm_meta::models::CatalogTrack;
use tsfm_meta::services::{
    AuthError, CatalogError, CatalogSearch, CredentialIssuer, IssuedToken, TokenAuthority,
    TrackResolver,
};

/// One recorded search call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedSearch {
    pub query: String,
    pub limit: u8,
    pub token: String,
}

/// Catalog stub returning queued responses in call order
///
/// When the queue runs dry every further call returns an empty result.
#[derive(Default)]
pub struct ScriptedCatalog {
    responses: Mutex<VecDeque<Result<Vec<CatalogTrack>, CatalogError>>>,
    calls: Mutex<Vec<RecordedSearch>>,
}

impl ScriptedCatalog {
    pub fn new(responses: Vec<Result<Vec<CatalogTrack>, CatalogError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedSearch> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn queries(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.query).collect()
    }
}

#[async_trait]
impl CatalogSearch for ScriptedCatalog {
    async fn search_tracks(
        &self,
        query: &str,
        limit: u8,
        token: &str,
    ) -> Result<Vec<CatalogTrack>, CatalogError> {
        self.calls.lock().unwrap().push(RecordedSearch {
            query: query.to_string(),
            limit,
            token: token.to_string(),
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// How the stub issuer behaves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssuerMode {
    /// Issue `token-<n>` valid for the given seconds
    Succeed(u64),
    /// Reject with HTTP 400
    Reject,
    /// Behave as if no credentials were configured
    Unconfigured,
}

pub struct StubIssuer {
    mode: IssuerMode,
    calls: AtomicUsize,
}

impl StubIssuer {
    pub fn new(mode: IssuerMode) -> Self {
        Self {
            mode,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialIssuer for StubIssuer {
    async fn issue(&self) -> Result<IssuedToken, AuthError> {
        match self.mode {
            IssuerMode::Unconfigured => Err(AuthError::NotConfigured),
            IssuerMode::Reject => {
                self.calls.fetch_add(1, Ordering::SeqCst);
                Err(AuthError::Rejected(400, "{\"error\":\"invalid_client\"}".to_string()))
            }
            IssuerMode::Succeed(expires_in) => {
                let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
                Ok(IssuedToken {
                    access_token: format!("token-{}", n),
                    expires_in,
                })
            }
        }
    }

    fn is_configured(&self) -> bool {
        self.mode != IssuerMode::Unconfigured
    }
}

/// Resolver wired to stubs, with handles for assertions
pub struct Harness {
    pub resolver: TrackResolver,
    pub catalog: Arc<ScriptedCatalog>,
    pub issuer: Arc<StubIssuer>,
    pub clock: Arc<ManualClock>,
}

pub fn harness(
    responses: Vec<Result<Vec<CatalogTrack>, CatalogError>>,
    mode: IssuerMode,
) -> Harness {
    let catalog = Arc::new(ScriptedCatalog::new(responses));
    let issuer = Arc::new(StubIssuer::new(mode));
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let tokens = Arc::new(TokenAuthority::new(issuer.clone(), clock.clone()));
    let resolver = TrackResolver::new(catalog.clone(), tokens);

    Harness {
        resolver,
        catalog,
        issuer,
        clock,
    }
}

/// Build a catalog candidate
pub fn track(title: &str, artists: &[&str], images: &[&str]) -> CatalogTrack {
    CatalogTrack {
        title: title.to_string(),
        artists: artists.iter().map(|a| a.to_string()).collect(),
        album: Some(format!("{} (Album)", title)),
        images: images.iter().map(|i| i.to_string()).collect(),
        release_date: Some("2016-05-13".to_string()),
        external_url: Some(format!("https://open.spotify.com/track/{}", title.replace(' ', ""))),
        duration_ms: Some(210_000),
        preview_url: Some("https://p.scdn.co/mp3-preview/abc".to_string()),
    }
}

pub fn get_lucky() -> CatalogTrack {
    track(
        "Get Lucky",
        &["Daft Punk", "Pharrell Williams", "Nile Rodgers"],
        &[
            "https://i.scdn.co/image/large",
            "https://i.scdn.co/image/medium",
            "https://i.scdn.co/image/small",
        ],
    )
}
