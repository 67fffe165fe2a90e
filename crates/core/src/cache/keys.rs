//! Key helpers.

use crate::error::{CacheError, Result};

/// Rejects keys the cache cannot store.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::Operation("cache key must not be empty".to_string()));
    }
    Ok(())
}

/// Builds the stored key, adding the configured namespace (e.g., `"site1:page:42"`).
pub fn namespaced_key(prefix: Option<&str>, key: &str) -> Result<String> {
    validate_key(key)?;
    Ok(match prefix {
        Some(prefix) => format!("{prefix}:{key}"),
        None => key.to_string(),
    })
}
