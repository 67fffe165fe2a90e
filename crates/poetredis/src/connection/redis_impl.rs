//! Redis transport using the redis crate's multiplexed async connection.

use async_trait::async_trait;
use redis::AsyncCommands;

use poetredis_core::{connection_url, CacheError, Configuration, Result};

use super::{ttl_millis, Command, Connection, Connector, Reply};
use crate::error::{map_auth_error, map_redis_error};

/// Opens TCP, TLS or unix socket connections to Redis.
///
/// Credentials are never part of the client URL; the pool authenticates
/// each new connection through the [`AuthNegotiator`](crate::AuthNegotiator).
pub struct RedisConnector {
    client: redis::Client,
    url: String,
}

impl RedisConnector {
    /// Creates a connector for a validated configuration. No I/O happens here.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::InvalidConfig` if the redis crate rejects the
    /// derived URL (e.g., unix sockets on a platform without them).
    pub fn new(config: &Configuration) -> Result<Self> {
        let url = connection_url(config);
        let client =
            redis::Client::open(url.as_str()).map_err(|e| CacheError::InvalidConfig(e.to_string()))?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl Connector for RedisConnector {
    async fn connect(&self) -> Result<Box<dyn Connection>> {
        let conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(map_redis_error)?;
        Ok(Box::new(RedisConnection { conn }))
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// A single Redis connection owned by the pool.
pub struct RedisConnection {
    conn: redis::aio::MultiplexedConnection,
}

#[async_trait]
impl Connection for RedisConnection {
    async fn execute(&mut self, command: &Command<'_>) -> Result<Reply> {
        let conn = &mut self.conn;

        match *command {
            Command::Auth { username, password } => {
                let mut cmd = redis::cmd("AUTH");
                if let Some(username) = username {
                    cmd.arg(username);
                }
                cmd.arg(password);
                let _: () = cmd.query_async(conn).await.map_err(map_auth_error)?;
                Ok(Reply::Ok)
            }
            Command::Ping => {
                let _: String = redis::cmd("PING")
                    .query_async(conn)
                    .await
                    .map_err(map_redis_error)?;
                Ok(Reply::Pong)
            }
            Command::Get { key } => {
                let value: Option<Vec<u8>> = conn.get(key).await.map_err(map_redis_error)?;
                Ok(Reply::Value(value))
            }
            Command::Set { key, value, ttl } => {
                match ttl {
                    Some(ttl) => {
                        let _: () = redis::cmd("SET")
                            .arg(key)
                            .arg(value)
                            .arg("PX")
                            .arg(ttl_millis(ttl))
                            .query_async(conn)
                            .await
                            .map_err(map_redis_error)?;
                    }
                    None => {
                        conn.set::<_, _, ()>(key, value)
                            .await
                            .map_err(map_redis_error)?;
                    }
                }
                Ok(Reply::Ok)
            }
            Command::Del { key } => {
                let removed: i64 = conn.del(key).await.map_err(map_redis_error)?;
                Ok(Reply::Existed(removed > 0))
            }
            Command::Expire { key, ttl } => {
                let updated: i64 = redis::cmd("PEXPIRE")
                    .arg(key)
                    .arg(ttl_millis(ttl))
                    .query_async(conn)
                    .await
                    .map_err(map_redis_error)?;
                Ok(Reply::Existed(updated == 1))
            }
        }
    }
}
