//! Connection pool sizing, timeouts and retry policy (validated).

use std::time::Duration;

use thiserror::Error;

/// Pool configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PoolConfigError {
    #[error("Pool size must be at least 1")]
    InvalidPoolSize,

    #[error("{0} timeout must be positive")]
    InvalidTimeout(&'static str),

    #[error("Retry policy must allow at least one attempt")]
    InvalidAttempts,

    #[error("Backoff multiplier must be at least 1.0")]
    InvalidMultiplier,
}

/// Exponential backoff policy for establishing connections.
#[derive(Clone, Debug, PartialEq)]
pub struct RetryPolicy {
    /// Total connection attempts, including the first one.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub multiplier: f64,
    pub max_backoff: Duration,
}

impl RetryPolicy {
    /// Create and validate a retry policy.
    pub fn new(
        max_attempts: u32,
        initial_backoff: Duration,
        multiplier: f64,
        max_backoff: Duration,
    ) -> Result<Self, PoolConfigError> {
        if max_attempts == 0 {
            return Err(PoolConfigError::InvalidAttempts);
        }
        if !(multiplier >= 1.0) {
            return Err(PoolConfigError::InvalidMultiplier);
        }

        Ok(Self {
            max_attempts,
            initial_backoff,
            multiplier,
            max_backoff,
        })
    }

    /// Delay to wait after the failed attempt number `attempt` (0-based).
    ///
    /// `initial_backoff * multiplier^attempt`, capped at `max_backoff`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let base = self.initial_backoff.as_secs_f64() * self.multiplier.powi(exponent);
        let capped = base.min(self.max_backoff.as_secs_f64());
        // Near Duration::MAX the f64 round trip overflows; saturate at the cap.
        Duration::try_from_secs_f64(capped).unwrap_or(self.max_backoff)
    }

    /// Policy that never waits between attempts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff: Duration::ZERO,
            multiplier: 1.0,
            max_backoff: Duration::ZERO,
        }
    }
}

impl Default for RetryPolicy {
    /// 3 attempts, 50ms doubling up to 1s.
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(50),
            multiplier: 2.0,
            max_backoff: Duration::from_secs(1),
        }
    }
}

/// Configuration for the connection pool (validated).
#[derive(Clone, Debug, PartialEq)]
pub struct PoolConfig {
    /// Maximum number of connections checked out or idle at once.
    pub max_size: usize,
    /// How long `acquire` waits for a free slot.
    pub acquire_timeout: Duration,
    /// How long a single connect + handshake may take.
    pub connect_timeout: Duration,
    /// How long a single command may take.
    pub operation_timeout: Duration,
    pub retry: RetryPolicy,
}

impl PoolConfig {
    /// Create and validate pool config.
    pub fn new(
        max_size: usize,
        acquire_timeout: Duration,
        connect_timeout: Duration,
        operation_timeout: Duration,
        retry: RetryPolicy,
    ) -> Result<Self, PoolConfigError> {
        if max_size == 0 {
            return Err(PoolConfigError::InvalidPoolSize);
        }
        if acquire_timeout.is_zero() {
            return Err(PoolConfigError::InvalidTimeout("Acquire"));
        }
        if connect_timeout.is_zero() {
            return Err(PoolConfigError::InvalidTimeout("Connect"));
        }
        if operation_timeout.is_zero() {
            return Err(PoolConfigError::InvalidTimeout("Operation"));
        }

        Ok(Self {
            max_size,
            acquire_timeout,
            connect_timeout,
            operation_timeout,
            retry,
        })
    }

    /// Create with defaults (5s acquire, 2s connect, 2s per operation).
    pub fn with_defaults(max_size: usize) -> Result<Self, PoolConfigError> {
        Self::new(
            max_size,
            Duration::from_secs(5),
            Duration::from_secs(2),
            Duration::from_secs(2),
            RetryPolicy::default(),
        )
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_size: 8,
            acquire_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            operation_timeout: Duration::from_secs(2),
            retry: RetryPolicy::default(),
        }
    }
}
