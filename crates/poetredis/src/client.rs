//! Public cache client.
//!
//! Wraps a [`Cache`] with the `cacheactive` switch, key namespacing and
//! per-key writer locks. When caching is off every call answers `Disabled`
//! and nothing is built or sent.

use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use poetredis_core::cache::{deserialize_value, namespaced_key, serialize_value};
use poetredis_core::{Cache, Configuration, Lookup, PoolConfig, Result, WriteOutcome};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::cache::RedisCache;
use crate::connection::Connector;
use crate::locks::KeyLocks;
use crate::pool::{HealthStatus, PoolStats};

/// Cache client handed to application code.
///
/// Cloning is cheap; clones share the same pool and lock table.
pub struct CacheClient<C: Cache = RedisCache> {
    inner: Option<Arc<Active<C>>>,
}

struct Active<C> {
    cache: C,
    locks: KeyLocks,
    prefix: Option<String>,
}

impl<C: Cache> Clone for CacheClient<C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl CacheClient<RedisCache> {
    /// Build a client for a validated configuration.
    ///
    /// No connection is opened here. If caching is inactive no connector
    /// is built at all.
    ///
    /// # Errors
    ///
    /// `CacheError::InvalidConfig` if the redis driver rejects the endpoint.
    pub fn new(config: &Configuration, pool: PoolConfig) -> Result<Self> {
        if !config.is_active() {
            tracing::debug!("Redis cache inactive, client disabled");
            return Ok(Self::disabled());
        }
        Ok(Self::with_cache(config, RedisCache::new(config, pool)?))
    }

    /// Build a client that opens connections through `connector`.
    pub fn with_connector(
        config: &Configuration,
        pool: PoolConfig,
        connector: Arc<dyn Connector>,
    ) -> Self {
        if !config.is_active() {
            return Self::disabled();
        }
        Self::with_cache(config, RedisCache::with_connector(config, pool, connector))
    }

    /// Pool statistics, or `None` when caching is inactive.
    pub fn stats(&self) -> Option<PoolStats> {
        self.inner.as_ref().map(|active| active.cache.manager().stats())
    }

    /// PING the server, or `None` when caching is inactive.
    pub async fn health_check(&self) -> Option<HealthStatus> {
        match &self.inner {
            Some(active) => Some(active.cache.manager().health_check().await),
            None => None,
        }
    }
}

impl<C: Cache> CacheClient<C> {
    /// Wrap an existing cache, honouring the configuration's active flag
    /// and key prefix.
    pub fn with_cache(config: &Configuration, cache: C) -> Self {
        if !config.is_active() {
            return Self::disabled();
        }
        Self {
            inner: Some(Arc::new(Active {
                cache,
                locks: KeyLocks::new(),
                prefix: config.key_prefix().map(str::to_string),
            })),
        }
    }

    /// A client that answers `Disabled` to everything.
    pub fn disabled() -> Self {
        Self { inner: None }
    }

    pub fn is_active(&self) -> bool {
        self.inner.is_some()
    }

    /// Read a raw value.
    ///
    /// # Errors
    ///
    /// `CacheError::Operation` for an empty key, plus any pool or server error.
    pub async fn get(&self, key: &str) -> Result<Lookup<Vec<u8>>> {
        let Some(active) = &self.inner else {
            return Ok(Lookup::Disabled);
        };
        let key = active.key(key)?;
        Ok(active.cache.get(&key).await?.into())
    }

    /// Store a raw value. `ttl` of `None` means no expiry.
    pub async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<WriteOutcome> {
        let Some(active) = &self.inner else {
            return Ok(WriteOutcome::Disabled);
        };
        let key = active.key(key)?;
        let _guard = active.locks.lock(&key).await;
        active.cache.set(&key, value, ttl).await?;
        Ok(WriteOutcome::Applied)
    }

    /// Remove a key. `Missing` if it did not exist.
    pub async fn delete(&self, key: &str) -> Result<WriteOutcome> {
        let Some(active) = &self.inner else {
            return Ok(WriteOutcome::Disabled);
        };
        let key = active.key(key)?;
        let _guard = active.locks.lock(&key).await;
        Ok(active.cache.delete(&key).await?.into())
    }

    /// Set a key's time to live. `Missing` if it did not exist.
    pub async fn expire(&self, key: &str, ttl: Duration) -> Result<WriteOutcome> {
        let Some(active) = &self.inner else {
            return Ok(WriteOutcome::Disabled);
        };
        let key = active.key(key)?;
        let _guard = active.locks.lock(&key).await;
        Ok(active.cache.expire(&key, ttl).await?.into())
    }

    /// Read and deserialize a JSON value.
    ///
    /// # Errors
    ///
    /// `CacheError::Serialization` if the stored bytes are not valid JSON for `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Lookup<T>> {
        match self.get(key).await? {
            Lookup::Hit(bytes) => Ok(Lookup::Hit(deserialize_value(&bytes)?)),
            Lookup::Miss => Ok(Lookup::Miss),
            Lookup::Disabled => Ok(Lookup::Disabled),
        }
    }

    /// Serialize `value` as JSON and store it.
    pub async fn set_json<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<WriteOutcome> {
        if !self.is_active() {
            return Ok(WriteOutcome::Disabled);
        }
        let bytes = serialize_value(value)?;
        self.set(key, &bytes, ttl).await
    }

    /// Cache-aside read that never fails because of the cache.
    ///
    /// On a miss `compute` runs and its value is stored. When caching is
    /// disabled or the cache errors, the computed value is returned uncached.
    /// Concurrent callers missing the same key compute once.
    pub async fn get_or_compute<T, F, Fut>(&self, key: &str, ttl: Option<Duration>, compute: F) -> T
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let result = self
            .get_or_try_compute(key, ttl, move || async move {
                Ok::<_, Infallible>(compute().await)
            })
            .await;
        match result {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Like [`get_or_compute`](Self::get_or_compute) for fallible computations.
    ///
    /// Only errors from `compute` are returned; cache failures are logged and
    /// the computation's result is used as-is.
    pub async fn get_or_try_compute<T, E, F, Fut>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        compute: F,
    ) -> std::result::Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        let Some(active) = &self.inner else {
            return compute().await;
        };
        let full_key = match active.key(key) {
            Ok(full_key) => full_key,
            Err(err) => {
                tracing::warn!(key, error = %err, "Cache key rejected, computing uncached");
                return compute().await;
            }
        };

        match active.read::<T>(&full_key).await {
            Ok(Some(value)) => return Ok(value),
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(key = %full_key, error = %err, "Cache read failed, computing uncached");
                return compute().await;
            }
        }

        let _guard = active.locks.lock(&full_key).await;

        // Another writer may have filled the key while we waited.
        if let Ok(Some(value)) = active.read::<T>(&full_key).await {
            tracing::trace!(key = %full_key, "Cache filled while waiting for writer lock");
            return Ok(value);
        }

        let value = compute().await?;
        match serialize_value(&value) {
            Ok(bytes) => {
                if let Err(err) = active.cache.set(&full_key, &bytes, ttl).await {
                    tracing::warn!(key = %full_key, error = %err, "Failed to cache computed value");
                }
            }
            Err(err) => {
                tracing::warn!(key = %full_key, error = %err, "Computed value not serializable");
            }
        }
        Ok(value)
    }
}

impl<C: Cache> Active<C> {
    fn key(&self, key: &str) -> Result<String> {
        namespaced_key(self.prefix.as_deref(), key)
    }

    /// Read and decode `key`. Undecodable values count as a miss.
    async fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(bytes) = self.cache.get(key).await? else {
            tracing::trace!(key, "Cache miss");
            return Ok(None);
        };
        match deserialize_value(&bytes) {
            Ok(value) => {
                tracing::trace!(key, "Cache hit");
                Ok(Some(value))
            }
            Err(err) => {
                tracing::warn!(key, error = %err, "Cached value deserialization failed");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use poetredis_core::{CacheError, RetryPolicy, Settings};
    use serde::Deserialize;

    use super::*;
    use crate::testing::FakeServer;

    fn config(active: bool, prefix: Option<&str>) -> Configuration {
        Settings {
            cache_active: active,
            key_prefix: prefix.map(str::to_string),
            ..Settings::default()
        }
        .validate()
        .unwrap()
    }

    fn pool() -> PoolConfig {
        PoolConfig::new(
            4,
            Duration::from_secs(1),
            Duration::from_millis(200),
            Duration::from_millis(200),
            RetryPolicy::immediate(3),
        )
        .unwrap()
    }

    fn client(server: &Arc<FakeServer>, prefix: Option<&str>) -> CacheClient {
        CacheClient::with_connector(&config(true, prefix), pool(), server.connector())
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Page {
        id: u32,
        body: String,
    }

    #[tokio::test]
    async fn test_inactive_client_makes_zero_network_calls() {
        let server = FakeServer::new();
        let client = CacheClient::with_connector(&config(false, None), pool(), server.connector());
        let ttl = Some(Duration::from_secs(1));

        assert!(!client.is_active());
        assert_eq!(client.get("k").await.unwrap(), Lookup::Disabled);
        assert_eq!(client.set("k", b"v", ttl).await.unwrap(), WriteOutcome::Disabled);
        assert_eq!(client.delete("k").await.unwrap(), WriteOutcome::Disabled);
        assert_eq!(
            client.expire("k", Duration::from_secs(1)).await.unwrap(),
            WriteOutcome::Disabled
        );
        assert!(client.get_json::<Page>("k").await.unwrap().is_disabled());
        assert!(client.set_json("k", &1, ttl).await.unwrap().is_disabled());
        assert!(client.stats().is_none());
        assert!(client.health_check().await.is_none());

        assert_eq!(server.connects(), 0);
        assert_eq!(server.commands(), 0);
    }

    #[tokio::test]
    async fn test_inactive_new_builds_nothing() {
        let client = CacheClient::new(&config(false, None), PoolConfig::default()).unwrap();
        assert!(!client.is_active());
    }

    #[tokio::test]
    async fn test_inactive_get_or_compute_still_computes() {
        let client = CacheClient::<RedisCache>::disabled();

        let value = client
            .get_or_compute("k", None, || async { 42u32 })
            .await;

        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn test_set_get_delete() {
        let server = FakeServer::new();
        let client = client(&server, None);

        assert_eq!(client.get("k").await.unwrap(), Lookup::Miss);
        assert_eq!(
            client.set("k", b"v", None).await.unwrap(),
            WriteOutcome::Applied
        );
        assert_eq!(client.get("k").await.unwrap(), Lookup::Hit(b"v".to_vec()));
        assert_eq!(client.delete("k").await.unwrap(), WriteOutcome::Applied);
        assert_eq!(client.delete("k").await.unwrap(), WriteOutcome::Missing);
    }

    #[tokio::test]
    async fn test_value_absent_after_ttl() {
        let server = FakeServer::new();
        let client = client(&server, None);

        client
            .set("k", b"v", Some(Duration::from_millis(50)))
            .await
            .unwrap();
        assert!(client.get("k").await.unwrap().is_hit());

        tokio::time::sleep(Duration::from_millis(120)).await;

        assert_eq!(client.get("k").await.unwrap(), Lookup::Miss);
    }

    #[tokio::test]
    async fn test_expire_missing_key() {
        let server = FakeServer::new();
        let client = client(&server, None);

        let outcome = client.expire("nope", Duration::from_secs(5)).await.unwrap();

        assert_eq!(outcome, WriteOutcome::Missing);
    }

    #[tokio::test]
    async fn test_prefix_is_applied() {
        let server = FakeServer::new();
        let client = client(&server, Some("site1"));

        client.set("page:1", b"v", None).await.unwrap();

        assert!(server.contains("site1:page:1"));
        assert!(!server.contains("page:1"));
        assert!(client.get("page:1").await.unwrap().is_hit());
    }

    #[tokio::test]
    async fn test_empty_key_is_rejected() {
        let server = FakeServer::new();
        let client = client(&server, None);

        let result = client.get("").await;

        assert!(matches!(result, Err(CacheError::Operation(_))));
        assert_eq!(server.connects(), 0);
    }

    #[tokio::test]
    async fn test_json_helpers() {
        let server = FakeServer::new();
        let client = client(&server, None);
        let page = Page {
            id: 7,
            body: "hello".to_string(),
        };

        client.set_json("page:7", &page, None).await.unwrap();

        assert_eq!(
            client.get_json::<Page>("page:7").await.unwrap(),
            Lookup::Hit(page)
        );
    }

    #[tokio::test]
    async fn test_get_json_with_foreign_bytes() {
        let server = FakeServer::new();
        let client = client(&server, None);

        client.set("page:7", b"not json", None).await.unwrap();

        let result = client.get_json::<Page>("page:7").await;
        assert!(matches!(result, Err(CacheError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_get_or_compute_fills_then_hits() {
        let server = FakeServer::new();
        let client = client(&server, None);
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value = client
                .get_or_compute("answer", None, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    42u32
                })
                .await;
            assert_eq!(value, 42);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(server.contains("answer"));
    }

    #[tokio::test]
    async fn test_get_or_compute_falls_back_when_unreachable() {
        let server = FakeServer::new();
        server.refuse_all_connects();
        let client = client(&server, None);

        let value = client
            .get_or_compute("answer", None, || async { 42u32 })
            .await;

        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn test_get_or_try_compute_propagates_compute_error() {
        let server = FakeServer::new();
        let client = client(&server, None);

        let result: std::result::Result<u32, String> = client
            .get_or_try_compute("answer", None, || async { Err("boom".to_string()) })
            .await;

        assert_eq!(result, Err("boom".to_string()));
        assert!(!server.contains("answer"));
    }

    #[tokio::test]
    async fn test_concurrent_get_or_compute_computes_once() {
        let server = FakeServer::new();
        let client = client(&server, None);
        let calls = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let client = client.clone();
                let calls = Arc::clone(&calls);
                tokio::spawn(async move {
                    client
                        .get_or_compute("hot", None, || async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(20)).await;
                            "rendered".to_string()
                        })
                        .await
                })
            })
            .collect();

        for task in tasks {
            assert_eq!(task.await.unwrap(), "rendered");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_writes_to_different_keys_run_concurrently() {
        let server = FakeServer::new();
        server.set_command_delay(Duration::from_millis(30));
        let client = client(&server, None);

        let start = std::time::Instant::now();
        let (a, b) = tokio::join!(
            client.set("a", b"1", None),
            client.set("b", b"2", None)
        );
        a.unwrap();
        b.unwrap();

        // Serialized writes would need at least 60ms.
        assert!(start.elapsed() < Duration::from_millis(60));
    }
}
