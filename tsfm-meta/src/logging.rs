//! Tracing subscriber setup
//!
//! The global subscriber is installed before the config file is read, so
//! warnings from config loading are printed. `RUST_LOG` wins when set;
//! otherwise the filter starts at `info` and switches to `logging.level`
//! once the file has been loaded.

use tracing_subscriber::{
    fmt, layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry,
};
use tsfm_common::{Error, Result};

/// Filter used until the configured level is known
pub const STARTUP_LEVEL: &str = "info";

/// Handle for swapping the startup filter for the configured one
pub struct LogLevelHandle {
    /// `None` when `RUST_LOG` chose the filter
    reload: Option<reload::Handle<EnvFilter, Registry>>,
}

/// Install the global subscriber (registry + reloadable `EnvFilter` + fmt)
pub fn init() -> LogLevelHandle {
    let from_env = EnvFilter::try_from_default_env().ok();
    let env_override = from_env.is_some();

    let (filter, handle) =
        reload::Layer::new(from_env.unwrap_or_else(|| EnvFilter::new(STARTUP_LEVEL)));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();

    LogLevelHandle {
        reload: (!env_override).then_some(handle),
    }
}

/// Parse a `logging.level` value (plain level or full directive list)
pub fn parse_filter(level: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(level.trim())
        .map_err(|e| Error::Config(format!("Invalid logging.level {:?}: {}", level, e)))
}

impl LogLevelHandle {
    /// Switch to the configured level unless `RUST_LOG` is set
    pub fn apply_configured_level(&self, level: &str) -> Result<()> {
        let Some(handle) = &self.reload else {
            return Ok(());
        };

        let filter = parse_filter(level)?;
        handle
            .reload(filter)
            .map_err(|e| Error::Config(format!("Failed to apply log level: {}", e)))
    }

    /// Whether `RUST_LOG` overrides the configured level
    pub fn is_env_override(&self) -> bool {
        self.reload.is_none()
    }
}
