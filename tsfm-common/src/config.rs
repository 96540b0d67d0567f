//! Configuration loading and catalog credential resolution
//!
//! Bootstrap configuration comes from a single TOML file. Every field has a
//! built-in default, so a missing file is not an error: the service starts
//! with defaults and logs a warning.
//!
//! Catalog credentials resolve with ENV → TOML priority.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable holding the catalog client identifier
pub const CLIENT_ID_ENV: &str = "SPOTIFY_CLIENT_ID";

/// Environment variable holding the catalog client secret
pub const CLIENT_SECRET_ENV: &str = "SPOTIFY_CLIENT_SECRET";

/// Bootstrap configuration loaded from TOML file
///
/// These settings cannot change during runtime. The service must restart
/// to pick up changes to the file.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct TomlConfig {
    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Catalog (Spotify Web API) endpoints and credentials
    #[serde(default)]
    pub spotify: CatalogConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_bind")]
    pub bind: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Catalog endpoint configuration
#[derive(Clone, Deserialize, Serialize, PartialEq)]
pub struct CatalogConfig {
    /// Client-credentials token endpoint
    #[serde(default = "default_token_url")]
    pub token_url: String,

    /// Base URL of the catalog API (the `/search` path is appended)
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Per-request timeout for issuer and catalog calls
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Client identifier (environment variable takes priority)
    #[serde(default)]
    pub client_id: Option<String>,

    /// Client secret (environment variable takes priority)
    #[serde(default)]
    pub client_secret: Option<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            token_url: default_token_url(),
            api_base_url: default_api_base_url(),
            timeout_secs: default_timeout_secs(),
            client_id: None,
            client_secret: None,
        }
    }
}

impl fmt::Debug for CatalogConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogConfig")
            .field("token_url", &self.token_url)
            .field("api_base_url", &self.api_base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8001
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_token_url() -> String {
    "https://accounts.spotify.com/api/token".to_string()
}

fn default_api_base_url() -> String {
    "https://api.spotify.com/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

/// Client-credentials pair for the catalog's token issuer
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Default config file location: `<config_dir>/tsfm/tsfm-meta.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tsfm").join("tsfm-meta.toml"))
}

/// Load bootstrap configuration from a TOML file
///
/// A missing file yields defaults with a warning. An unreadable or
/// malformed file is an error.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        warn!(
            "Config file not found at {}, using built-in defaults",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed ({}): {}", path.display(), e)))?;
    let config: TomlConfig = toml::from_str(&content)?;

    if config.spotify.timeout_secs == 0 {
        return Err(Error::Config("spotify.timeout_secs must be greater than 0".to_string()));
    }

    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Validate a credential value (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Resolve catalog client credentials
///
/// **Priority:** ENV → TOML, per field.
///
/// Returns `Error::Config` naming what is missing. Callers treat this as
/// non-fatal: the service runs, and every resolution fails authentication.
pub fn resolve_client_credentials(config: &CatalogConfig) -> Result<ClientCredentials> {
    let client_id = pick_value(CLIENT_ID_ENV, config.client_id.as_deref());
    let client_secret = pick_value(CLIENT_SECRET_ENV, config.client_secret.as_deref());

    match (client_id, client_secret) {
        (Some(client_id), Some(client_secret)) => Ok(ClientCredentials {
            client_id,
            client_secret,
        }),
        (id, secret) => {
            let mut missing = Vec::new();
            if id.is_none() {
                missing.push(CLIENT_ID_ENV);
            }
            if secret.is_none() {
                missing.push(CLIENT_SECRET_ENV);
            }
            Err(Error::Config(format!(
                "Spotify credentials not configured (missing: {}). Set the environment \
                 variables or `client_id`/`client_secret` under [spotify] in the TOML config",
                missing.join(", ")
            )))
        }
    }
}

fn pick_value(env_name: &str, toml_value: Option<&str>) -> Option<String> {
    if let Ok(value) = std::env::var(env_name) {
        if is_valid_key(&value) {
            return Some(value.trim().to_string());
        }
    }

    toml_value
        .filter(|v| is_valid_key(v))
        .map(|v| v.trim().to_string())
}
