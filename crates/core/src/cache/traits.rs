use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

/// Trait for basic cache operations on raw bytes.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Gets a value from the cache by key.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Sets a value in the cache with an optional TTL. `None` never expires.
    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()>;

    /// Deletes a value from the cache by key. Returns true if the key existed.
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Sets a new TTL on an existing key. Returns true if the key existed.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool>;
}
