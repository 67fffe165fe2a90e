//! Connection seam between the pool and the wire.
//!
//! The pool only ever talks to [`Connector`] and [`Connection`], so the
//! handshake, retry and checkout rules are the same for every transport.

mod redis_impl;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use poetredis_core::{CacheError, Result};

pub use redis_impl::{RedisConnection, RedisConnector};

/// A single cache command.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// `AUTH [username] password`
    Auth {
        username: Option<&'a str>,
        password: &'a str,
    },
    Ping,
    Get {
        key: &'a str,
    },
    /// `SET key value [PX ttl]`
    Set {
        key: &'a str,
        value: &'a [u8],
        ttl: Option<Duration>,
    },
    Del {
        key: &'a str,
    },
    /// `PEXPIRE key ttl`
    Expire {
        key: &'a str,
        ttl: Duration,
    },
}

impl Command<'_> {
    /// Command name, safe to log.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Auth { .. } => "AUTH",
            Command::Ping => "PING",
            Command::Get { .. } => "GET",
            Command::Set { .. } => "SET",
            Command::Del { .. } => "DEL",
            Command::Expire { .. } => "PEXPIRE",
        }
    }
}

impl fmt::Debug for Command<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Auth { username, .. } => f
                .debug_struct("Auth")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Command::Ping => f.write_str("Ping"),
            Command::Get { key } => f.debug_struct("Get").field("key", key).finish(),
            Command::Set { key, value, ttl } => f
                .debug_struct("Set")
                .field("key", key)
                .field("len", &value.len())
                .field("ttl", ttl)
                .finish(),
            Command::Del { key } => f.debug_struct("Del").field("key", key).finish(),
            Command::Expire { key, ttl } => f
                .debug_struct("Expire")
                .field("key", key)
                .field("ttl", ttl)
                .finish(),
        }
    }
}

/// Reply to a [`Command`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Ok,
    Pong,
    Value(Option<Vec<u8>>),
    /// Whether the targeted key existed (DEL, PEXPIRE).
    Existed(bool),
}

impl Reply {
    pub fn into_value(self) -> Result<Option<Vec<u8>>> {
        match self {
            Reply::Value(value) => Ok(value),
            other => Err(unexpected(other)),
        }
    }

    pub fn into_existed(self) -> Result<bool> {
        match self {
            Reply::Existed(existed) => Ok(existed),
            other => Err(unexpected(other)),
        }
    }
}

fn unexpected(reply: Reply) -> CacheError {
    CacheError::Operation(format!("unexpected reply: {reply:?}"))
}

/// An established, exclusively owned connection.
#[async_trait]
pub trait Connection: Send {
    async fn execute(&mut self, command: &Command<'_>) -> Result<Reply>;
}

/// Opens new connections. Called by the pool only.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn Connection>>;

    /// Where this connector connects to, safe to log.
    fn describe(&self) -> String;
}

/// TTLs are sent in milliseconds, never below 1ms.
pub(crate) fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}
