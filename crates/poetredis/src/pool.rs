//! Connection pool with lazy connect, auth handshake and bounded retries.
//!
//! Checkout/checkin discipline: a semaphore sized `max_size` bounds how many
//! connections exist at once, and each connection is owned by exactly one
//! caller while checked out. Nothing is opened until the first `acquire`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use poetredis_core::{CacheError, PoolConfig, Result};
use serde::Serialize;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::auth::AuthNegotiator;
use crate::connection::{Command, Connection, Connector, Reply};

/// Lazily connected, shared pool of authenticated connections.
///
/// Cloning is cheap; clones share the same pool.
#[derive(Clone)]
pub struct ConnectionManager {
    inner: Arc<PoolInner>,
}

struct PoolInner {
    connector: Arc<dyn Connector>,
    negotiator: AuthNegotiator,
    config: PoolConfig,
    idle: Mutex<Vec<Box<dyn Connection>>>,
    slots: Arc<Semaphore>,
    opened_total: AtomicU64,
}

impl PoolInner {
    fn idle(&self) -> std::sync::MutexGuard<'_, Vec<Box<dyn Connection>>> {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ConnectionManager {
    /// Create a new pool. No connection is opened here.
    pub fn new(
        connector: Arc<dyn Connector>,
        negotiator: AuthNegotiator,
        config: PoolConfig,
    ) -> Self {
        let slots = Arc::new(Semaphore::new(config.max_size));
        Self {
            inner: Arc::new(PoolInner {
                connector,
                negotiator,
                config,
                idle: Mutex::new(Vec::new()),
                slots,
                opened_total: AtomicU64::new(0),
            }),
        }
    }

    /// Check out a live connection.
    ///
    /// Reuses an idle connection when one exists, otherwise opens and
    /// authenticates a new one.
    ///
    /// # Errors
    ///
    /// - `CacheError::Connection` if no slot frees up within `acquire_timeout`
    ///   or every connect attempt fails
    /// - `CacheError::Auth` if the server rejects the credentials
    pub async fn acquire(&self) -> Result<PooledConnection> {
        let permit = self.slot().await?;

        let idle = self.inner.idle().pop();
        if let Some(conn) = idle {
            return Ok(PooledConnection::new(conn, true, &self.inner, permit));
        }

        let conn = self.establish().await?;
        Ok(PooledConnection::new(conn, false, &self.inner, permit))
    }

    /// Check out a newly opened connection, skipping the idle list.
    async fn acquire_fresh(&self) -> Result<PooledConnection> {
        let permit = self.slot().await?;
        let conn = self.establish().await?;
        Ok(PooledConnection::new(conn, false, &self.inner, permit))
    }

    /// Wait up to `acquire_timeout` for a free slot.
    async fn slot(&self) -> Result<OwnedSemaphorePermit> {
        let acquire_timeout = self.inner.config.acquire_timeout;
        tokio::time::timeout(
            acquire_timeout,
            Arc::clone(&self.inner.slots).acquire_owned(),
        )
        .await
        .map_err(|_| {
            CacheError::Connection(format!(
                "no free connection within {}ms",
                acquire_timeout.as_millis()
            ))
        })?
        .map_err(|_| CacheError::Connection("connection pool closed".to_string()))
    }

    /// Return a connection to the pool. Broken connections are discarded.
    ///
    /// Dropping a [`PooledConnection`] has the same effect.
    pub fn release(&self, conn: PooledConnection) {
        drop(conn);
    }

    /// Run one command on a pooled connection.
    ///
    /// If a reused idle connection turns out to be dead, the idle list is
    /// flushed and the command is retried once on a newly opened connection.
    /// The retry never takes from the idle list, since callers still holding
    /// connections from before the failure may put them back at any time.
    ///
    /// No single limit bounds the call. One attempt may take up to
    /// `acquire_timeout`, plus `retry.max_attempts` connect timeouts and their
    /// backoff, plus `operation_timeout`; the retry can add as much again.
    pub async fn execute(&self, command: &Command<'_>) -> Result<Reply> {
        let mut conn = self.acquire().await?;
        match conn.execute(command).await {
            Err(err) if err.is_connection() && conn.is_reused() => {
                drop(conn);
                let flushed = {
                    let mut idle = self.inner.idle();
                    let count = idle.len();
                    idle.clear();
                    count
                };
                tracing::debug!(
                    command = command.name(),
                    flushed_idle = flushed,
                    error = %err,
                    "Pooled connection is dead, reconnecting"
                );
                let mut fresh = self.acquire_fresh().await?;
                fresh.execute(command).await
            }
            result => result,
        }
    }

    /// Pool statistics (passive - no I/O).
    pub fn stats(&self) -> PoolStats {
        let max_size = self.inner.config.max_size;
        PoolStats {
            max_size,
            idle: self.inner.idle().len(),
            in_use: max_size - self.inner.slots.available_permits(),
            opened_total: self.inner.opened_total.load(Ordering::Relaxed),
        }
    }

    /// Active health check - sends PING and measures latency.
    pub async fn health_check(&self) -> HealthStatus {
        let start = Instant::now();
        let result = self.execute(&Command::Ping).await;
        let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        HealthStatus {
            healthy: result.is_ok(),
            latency_ms,
            endpoint: self.inner.connector.describe(),
            stats: self.stats(),
            error: result.err().map(|e| e.to_string()),
        }
    }

    /// Open and authenticate a connection, retrying connection failures
    /// with exponential backoff up to `retry.max_attempts` attempts in total.
    async fn establish(&self) -> Result<Box<dyn Connection>> {
        let policy = &self.inner.config.retry;
        let mut attempt = 0u32;

        loop {
            match self.connect_once().await {
                Ok(conn) => return Ok(conn),
                Err(err) if err.is_connection() && attempt + 1 < policy.max_attempts => {
                    let backoff = policy.backoff(attempt);
                    tracing::warn!(
                        attempt = attempt + 1,
                        max_attempts = policy.max_attempts,
                        backoff_ms = u64::try_from(backoff.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "Redis connect failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(err) => {
                    if err.is_connection() {
                        tracing::warn!(
                            attempts = attempt + 1,
                            endpoint = %self.inner.connector.describe(),
                            error = %err,
                            "Redis connect attempts exhausted"
                        );
                    }
                    return Err(err);
                }
            }
        }
    }

    async fn connect_once(&self) -> Result<Box<dyn Connection>> {
        let connect_timeout = self.inner.config.connect_timeout;
        let handshake = async {
            let mut conn = self.inner.connector.connect().await?;
            self.inner.negotiator.negotiate(conn.as_mut()).await?;
            Ok::<_, CacheError>(conn)
        };

        let conn = tokio::time::timeout(connect_timeout, handshake)
            .await
            .map_err(|_| {
                CacheError::Connection(format!(
                    "connect timed out after {}ms",
                    connect_timeout.as_millis()
                ))
            })??;

        self.inner.opened_total.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            endpoint = %self.inner.connector.describe(),
            auth = self.inner.negotiator.mode().name(),
            "Redis connection established"
        );
        Ok(conn)
    }
}

/// A checked-out connection. Returned to the pool on drop unless broken.
pub struct PooledConnection {
    conn: Option<Box<dyn Connection>>,
    reused: bool,
    broken: bool,
    pool: Arc<PoolInner>,
    _permit: OwnedSemaphorePermit,
}

impl PooledConnection {
    fn new(
        conn: Box<dyn Connection>,
        reused: bool,
        pool: &Arc<PoolInner>,
        permit: OwnedSemaphorePermit,
    ) -> Self {
        Self {
            conn: Some(conn),
            reused,
            broken: false,
            pool: Arc::clone(pool),
            _permit: permit,
        }
    }

    /// True if this connection came from the idle list rather than a fresh connect.
    pub fn is_reused(&self) -> bool {
        self.reused
    }

    pub fn is_broken(&self) -> bool {
        self.broken
    }

    /// Prevent this connection from going back to the pool.
    pub fn mark_broken(&mut self) {
        self.broken = true;
    }

    /// Run a command with the pool's operation timeout. A connection
    /// failure or timeout marks the connection broken.
    pub async fn execute(&mut self, command: &Command<'_>) -> Result<Reply> {
        let operation_timeout = self.pool.config.operation_timeout;
        let conn = self
            .conn
            .as_mut()
            .ok_or_else(|| CacheError::Connection("connection already released".to_string()))?;

        let result = match tokio::time::timeout(operation_timeout, conn.execute(command)).await {
            Ok(result) => result,
            Err(_) => Err(CacheError::Connection(format!(
                "{} timed out after {}ms",
                command.name(),
                operation_timeout.as_millis()
            ))),
        };

        if matches!(&result, Err(err) if err.is_connection()) {
            self.broken = true;
        }
        result
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            if !self.broken {
                self.pool.idle().push(conn);
            }
        }
    }
}

/// Pool statistics (passive data).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    pub max_size: usize,
    pub idle: usize,
    pub in_use: usize,
    pub opened_total: u64,
}

/// Health check result.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub healthy: bool,
    pub latency_ms: u64,
    pub endpoint: String,
    pub stats: PoolStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
