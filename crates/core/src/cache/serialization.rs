//! Pure functions for serializing values to/from cache bytes.
//!
//! These functions use JSON serialization for cache storage, providing human-readable
//! cache values that are easy to debug and inspect.

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{CacheError, Result};

/// Serializes a value to JSON bytes.
pub fn serialize_value<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| CacheError::Serialization(e.to_string()))
}

/// Deserializes JSON bytes to a value.
pub fn deserialize_value<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| CacheError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Page {
        id: u32,
        title: String,
    }

    #[test]
    fn test_serialized_value_is_json() {
        let page = Page {
            id: 42,
            title: "Home".to_string(),
        };
        let bytes = serialize_value(&page).unwrap();
        assert_eq!(bytes, br#"{"id":42,"title":"Home"}"#);
        assert_eq!(deserialize_value::<Page>(&bytes).unwrap(), page);
    }

    #[test]
    fn test_deserialize_invalid_json() {
        let result: Result<Page> = deserialize_value(b"not json");
        assert!(matches!(result, Err(CacheError::Serialization(_))));
    }

    #[test]
    fn test_deserialize_wrong_shape() {
        let result: Result<Page> = deserialize_value(br#"{"id":"x"}"#);
        assert!(matches!(result, Err(CacheError::Serialization(_))));
    }
}
