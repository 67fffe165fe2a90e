//! Redis cache implementation on top of the connection pool.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use poetredis_core::{Cache, Configuration, PoolConfig, Result};

use crate::auth::AuthNegotiator;
use crate::connection::{Command, Connector, RedisConnector};
use crate::pool::ConnectionManager;

/// Redis cache backend using the pooled [`ConnectionManager`].
///
/// Creating one performs no I/O; the first command opens the first
/// connection.
#[derive(Clone)]
pub struct RedisCache {
    manager: ConnectionManager,
}

impl RedisCache {
    /// Creates a Redis cache for a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::InvalidConfig` if the endpoint cannot be used
    /// by the redis driver.
    pub fn new(config: &Configuration, pool: PoolConfig) -> Result<Self> {
        let connector = Arc::new(RedisConnector::new(config)?);
        Ok(Self::with_connector(config, pool, connector))
    }

    /// Creates a Redis cache that opens connections through `connector`.
    pub fn with_connector(
        config: &Configuration,
        pool: PoolConfig,
        connector: Arc<dyn Connector>,
    ) -> Self {
        let negotiator = AuthNegotiator::from_config(config);
        Self {
            manager: ConnectionManager::new(connector, negotiator, pool),
        }
    }

    pub fn manager(&self) -> &ConnectionManager {
        &self.manager
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.manager.execute(&Command::Get { key }).await?.into_value()
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        self.manager
            .execute(&Command::Set { key, value, ttl })
            .await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        self.manager.execute(&Command::Del { key }).await?.into_existed()
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool> {
        self.manager
            .execute(&Command::Expire { key, ttl })
            .await?
            .into_existed()
    }
}
