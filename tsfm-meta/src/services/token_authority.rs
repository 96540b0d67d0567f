//! Catalog credential cache
//!
//! Obtains bearer tokens from the catalog's client-credentials endpoint and
//! caches them until shortly before expiry.
//!
//! **Refresh policy:**
//! - Cached token returned unchanged while `now < expires_at` (no network call)
//! - `expires_at = issued_at + expires_in - 300s`, so a token is never handed
//!   out during its last five minutes
//! - Refresh is single-flight: the cache lock is held across the issuer call,
//!   so concurrent callers observing an expired token wait for one refresh
//! - Issuer failures are returned to the caller, never retried here
//! - A 401 from the catalog evicts only the token it rejected

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tsfm_common::config::{CatalogConfig, ClientCredentials};

use crate::clock::Clock;

/// Seconds shaved off the issuer's TTL before a token is considered expired
pub const EXPIRY_MARGIN_SECS: u64 = 300;

/// TTL assumed when the issuer omits `expires_in`
const DEFAULT_EXPIRES_IN_SECS: u64 = 3600;

/// Credential issuer errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Client id/secret were never configured
    #[error("Spotify client credentials are not configured")]
    NotConfigured,

    #[error("Token endpoint rejected credentials ({0}): {1}")]
    Rejected(u16, String),

    #[error("Network error contacting token endpoint: {0}")]
    Network(String),

    #[error("Malformed token response: {0}")]
    MalformedResponse(String),
}

/// Token as returned by the issuer, before expiry bookkeeping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub access_token: String,
    /// Lifetime in seconds as reported by the issuer
    pub expires_in: u64,
}

/// Source of fresh bearer tokens
#[async_trait]
pub trait CredentialIssuer: Send + Sync {
    /// Perform one credential exchange
    async fn issue(&self) -> Result<IssuedToken, AuthError>;

    /// Whether credentials are present at all
    fn is_configured(&self) -> bool {
        true
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Client-credentials exchange over HTTP
///
/// `POST <token_url>` with HTTP Basic auth and `grant_type=client_credentials`.
pub struct HttpCredentialIssuer {
    http_client: reqwest::Client,
    token_url: String,
    credentials: Option<ClientCredentials>,
}

impl HttpCredentialIssuer {
    /// Build an issuer; `credentials` may be `None` when configuration is
    /// missing, in which case every `issue()` fails with `NotConfigured`.
    pub fn new(
        config: &CatalogConfig,
        credentials: Option<ClientCredentials>,
    ) -> Result<Self, AuthError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AuthError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            token_url: config.token_url.clone(),
            credentials,
        })
    }
}

#[async_trait]
impl CredentialIssuer for HttpCredentialIssuer {
    async fn issue(&self) -> Result<IssuedToken, AuthError> {
        let creds = self.credentials.as_ref().ok_or(AuthError::NotConfigured)?;

        tracing::debug!(url = %self.token_url, "Requesting Spotify access token");

        let response = self
            .http_client
            .post(&self.token_url)
            .basic_auth(&creds.client_id, Some(&creds.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AuthError::Rejected(status.as_u16(), error_text));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::MalformedResponse(e.to_string()))?;

        if body.access_token.trim().is_empty() {
            return Err(AuthError::MalformedResponse("empty access_token".to_string()));
        }

        Ok(IssuedToken {
            access_token: body.access_token,
            expires_in: body.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS),
        })
    }

    fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }
}

/// Cached bearer token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: String,
    /// Already includes the safety margin
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    /// Apply the expiry margin to a fresh token
    ///
    /// A lifetime that does not fit a timestamp is reported as a malformed
    /// issuer response.
    fn from_issued(issued: IssuedToken, now: DateTime<Utc>) -> Result<Self, AuthError> {
        let lifetime = issued.expires_in.saturating_sub(EXPIRY_MARGIN_SECS);
        let expires_at = i64::try_from(lifetime)
            .ok()
            .and_then(ChronoDuration::try_seconds)
            .and_then(|delta| now.checked_add_signed(delta))
            .ok_or_else(|| {
                AuthError::MalformedResponse(format!(
                    "expires_in out of range: {}",
                    issued.expires_in
                ))
            })?;

        Ok(Self {
            token: issued.access_token,
            expires_at,
        })
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Owns the cached credential and refreshes it on demand
pub struct TokenAuthority {
    issuer: Arc<dyn CredentialIssuer>,
    clock: Arc<dyn Clock>,
    cached: Mutex<Option<Credential>>,
}

impl TokenAuthority {
    pub fn new(issuer: Arc<dyn CredentialIssuer>, clock: Arc<dyn Clock>) -> Self {
        Self {
            issuer,
            clock,
            cached: Mutex::new(None),
        }
    }

    /// Return a valid bearer token, refreshing if the cache is empty or expired
    pub async fn get_token(&self) -> Result<String, AuthError> {
        let mut cached = self.cached.lock().await;

        if let Some(credential) = cached.as_ref() {
            if credential.is_valid_at(self.clock.now()) {
                return Ok(credential.token.clone());
            }
            tracing::debug!(expired_at = %credential.expires_at, "Cached Spotify token expired");
        }

        let issued = match self.issuer.issue().await {
            Ok(issued) => issued,
            Err(e) => {
                *cached = None;
                tracing::error!(error = %e, "Failed to get Spotify access token");
                return Err(e);
            }
        };

        let credential = match Credential::from_issued(issued, self.clock.now()) {
            Ok(credential) => credential,
            Err(e) => {
                *cached = None;
                tracing::error!(error = %e, "Rejected Spotify access token");
                return Err(e);
            }
        };
        tracing::info!(expires_at = %credential.expires_at, "Obtained Spotify access token");

        let token = credential.token.clone();
        *cached = Some(credential);
        Ok(token)
    }

    /// Drop the cached credential if it still holds `rejected`
    ///
    /// A token refreshed by another caller after `rejected` was handed out
    /// is kept.
    pub async fn invalidate_if(&self, rejected: &str) {
        let mut cached = self.cached.lock().await;
        if cached.as_ref().is_some_and(|c| c.token == rejected) {
            *cached = None;
            tracing::debug!("Cached Spotify token invalidated");
        }
    }

    pub fn is_configured(&self) -> bool {
        self.issuer.is_configured()
    }

    /// Snapshot of the cached credential
    pub async fn cached_credential(&self) -> Option<Credential> {
        self.cached.lock().await.clone()
    }
}
