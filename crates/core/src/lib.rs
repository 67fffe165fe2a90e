//! Pure cache logic for poetredis - no I/O, no sockets, no side effects.
//!
//! This crate provides:
//! - The CMS settings object and its validation into a [`Configuration`]
//! - Pool sizing, timeouts and the retry/backoff policy
//! - Error types shared by every cache layer
//! - The [`Cache`] trait, read/write outcomes and value serialization
//!
//! # Example
//!
//! ```
//! use poetredis_core::{connection_url, Settings};
//!
//! let settings: Settings = serde_json::from_str(
//!     r#"{"servername": "cache.local", "serverport": "6380", "cacheactive": 1}"#,
//! )
//! .unwrap();
//!
//! let config = settings.validate().unwrap();
//! assert!(config.is_active());
//! assert_eq!(connection_url(&config), "redis://cache.local:6380/");
//! ```

pub mod cache;
mod error;
mod pool;
pub mod serde;
mod settings;

pub use cache::{Cache, Lookup, WriteOutcome};
pub use error::{CacheError, Result};
pub use pool::{PoolConfig, PoolConfigError, RetryPolicy};
pub use settings::{
    connection_url, validate, AuthMode, ConfigError, Configuration, Endpoint, Settings,
};
