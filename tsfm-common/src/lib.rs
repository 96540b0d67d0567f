//! # TSFM Common Library
//!
//! Shared code for the TruckSim FM companion services including:
//! - Common error and result types
//! - TOML bootstrap configuration loading
//! - Catalog credential lookup

pub mod config;
pub mod error;

pub use error::{Error, Result};
