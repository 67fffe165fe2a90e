//! Redis cache client - Imperative Shell.
//!
//! This crate performs the I/O for the pure rules in `poetredis_core`:
//! it opens and pools connections, authenticates them, and runs cache
//! commands against Redis.
//!
//! # Architecture
//!
//! - **Functional Core** (`poetredis_core`): settings validation, retry policy, outcomes
//! - **Imperative Shell** (this crate): sockets, pooling, timeouts, auth handshake
//!
//! # Example
//!
//! ```ignore
//! use poetredis::{CacheClient, PoolConfig, Settings};
//! use std::time::Duration;
//!
//! // Validate the settings supplied by the CMS (pure)
//! let config = Settings::from_env().validate()?;
//!
//! // Build the client (no I/O until the first command)
//! let client = CacheClient::new(&config, PoolConfig::default())?;
//!
//! client.set("page:42", b"<html>", Some(Duration::from_secs(60))).await?;
//! let page = client.get("page:42").await?;
//! ```

mod auth;
mod cache;
mod client;
pub mod connection;
mod error;
mod locks;
mod pool;

#[cfg(test)]
mod testing;

// Re-export core types for convenience
pub use poetredis_core::{
    connection_url, AuthMode, Cache, CacheError, ConfigError, Configuration, Endpoint, Lookup,
    PoolConfig, Result, RetryPolicy, Settings, WriteOutcome,
};

// Export shell types
pub use auth::AuthNegotiator;
pub use cache::RedisCache;
pub use client::CacheClient;
pub use connection::{Command, Connection, Connector, RedisConnector, Reply};
pub use error::map_redis_error;
pub use locks::{KeyGuard, KeyLocks};
pub use pool::{ConnectionManager, HealthStatus, PoolStats, PooledConnection};
