//! Common error types for TSFM

use thiserror::Error;

/// Common result type for TSFM operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across TSFM services
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(format!("Parse TOML failed: {}", err))
    }
}
