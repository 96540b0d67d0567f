//! tsfm-meta - Now-playing metadata resolution service
//!
//! Resolves the station's (artist, title) pairs to Spotify track metadata
//! (canonical names, album art, release date, links) over HTTP.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};

use tsfm_common::config::{self, TomlConfig};
use tsfm_meta::clock::SystemClock;
use tsfm_meta::logging;
use tsfm_meta::services::{HttpCatalogClient, HttpCredentialIssuer, TokenAuthority, TrackResolver};
use tsfm_meta::AppState;

/// Command-line arguments for tsfm-meta
#[derive(Parser, Debug)]
#[command(name = "tsfm-meta")]
#[command(about = "Now-playing metadata resolution service for TruckSim FM")]
#[command(version)]
struct Args {
    /// Path to TOML config file
    #[arg(short, long, env = "TSFM_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config)
    #[arg(short, long, env = "TSFM_PORT")]
    port: Option<u16>,

    /// Address to bind (overrides config)
    #[arg(short, long, env = "TSFM_BIND")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing first so config loading is logged
    let log_level = logging::init();

    let args = Args::parse();

    info!("Starting tsfm-meta (metadata resolution) service");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config_path = args.config.clone().or_else(config::default_config_path);
    let toml_config = match &config_path {
        Some(path) => config::load_toml_config(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => {
            warn!("No config directory available, using built-in defaults");
            TomlConfig::default()
        }
    };

    if log_level.is_env_override() {
        info!("RUST_LOG set, ignoring logging.level from config");
    } else if let Err(e) = log_level.apply_configured_level(&toml_config.logging.level) {
        warn!("{}, keeping level {}", e, logging::STARTUP_LEVEL);
    }

    // Missing credentials are logged, not fatal: every resolution fails until fixed
    let credentials = match config::resolve_client_credentials(&toml_config.spotify) {
        Ok(creds) => {
            info!(client_id = %creds.client_id, "Spotify credentials loaded");
            Some(creds)
        }
        Err(e) => {
            error!("{}", e);
            None
        }
    };

    let issuer = HttpCredentialIssuer::new(&toml_config.spotify, credentials)
        .context("Failed to build token client")?;
    let catalog =
        HttpCatalogClient::new(&toml_config.spotify).context("Failed to build search client")?;

    let tokens = Arc::new(TokenAuthority::new(Arc::new(issuer), Arc::new(SystemClock)));
    let resolver = Arc::new(TrackResolver::new(Arc::new(catalog), tokens));

    let state = AppState::new(resolver);
    let app = tsfm_meta::build_router(state);

    let bind = args.bind.unwrap_or(toml_config.server.bind);
    let port = args.port.unwrap_or(toml_config.server.port);
    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", bind, port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down");
        },
    }
}
