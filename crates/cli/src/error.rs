//! CLI error types.

use std::path::PathBuf;

use poetredis_core::{CacheError, ConfigError};
use thiserror::Error;

/// Result type alias for the CLI.
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur while running a command.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to read settings file {path}: {source}")]
    SettingsFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid settings: {0}")]
    Settings(#[from] ConfigError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("Redis is unhealthy: {0}")]
    Unhealthy(String),
}
