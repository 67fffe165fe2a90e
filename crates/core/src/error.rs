use thiserror::Error;

use crate::pool::PoolConfigError;
use crate::settings::ConfigError;

/// Errors that can occur during cache operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("Invalid cache configuration: {0}")]
    InvalidConfig(String),
    #[error("Cache connection failed: {0}")]
    Connection(String),
    #[error("Cache authentication failed: {0}")]
    Auth(String),
    #[error("Cache operation failed: {0}")]
    Operation(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CacheError {
    /// Returns true for failures of the transport itself (refused, dropped,
    /// timed out). These are the only failures worth reconnecting for.
    pub fn is_connection(&self) -> bool {
        matches!(self, CacheError::Connection(_))
    }
}

impl From<ConfigError> for CacheError {
    fn from(err: ConfigError) -> Self {
        CacheError::InvalidConfig(err.to_string())
    }
}

impl From<PoolConfigError> for CacheError {
    fn from(err: PoolConfigError) -> Self {
        CacheError::InvalidConfig(err.to_string())
    }
}

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
