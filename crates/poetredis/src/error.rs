//! Redis error mapping to CacheError.

use poetredis_core::CacheError;

/// Maps Redis errors to CacheError.
pub fn map_redis_error(err: redis::RedisError) -> CacheError {
    if is_transport_error(&err) {
        CacheError::Connection(err.to_string())
    } else if err.kind() == redis::ErrorKind::AuthenticationFailed
        || matches!(err.code(), Some("NOAUTH" | "WRONGPASS"))
    {
        CacheError::Auth(err.to_string())
    } else {
        CacheError::Operation(err.to_string())
    }
}

/// Maps errors from an `AUTH` command. Any reply from the server is a
/// rejection; only transport failures stay connection errors.
pub(crate) fn map_auth_error(err: redis::RedisError) -> CacheError {
    if is_transport_error(&err) {
        CacheError::Connection(err.to_string())
    } else {
        CacheError::Auth(err.to_string())
    }
}

fn is_transport_error(err: &redis::RedisError) -> bool {
    err.is_connection_refusal()
        || err.is_timeout()
        || err.is_connection_dropped()
        || err.is_io_error()
}
