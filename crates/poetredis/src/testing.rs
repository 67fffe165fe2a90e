//! In-process fake Redis used by unit tests.
//!
//! Counts connects and commands so tests can assert exactly how much
//! traffic an operation caused.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use poetredis_core::{CacheError, Result};

use crate::connection::{Command, Connection, Connector, Reply};

#[derive(Default)]
struct State {
    data: HashMap<String, (Vec<u8>, Option<Instant>)>,
    auth_log: Vec<(Option<String>, String)>,
    connect_delay: Duration,
    command_delay: Duration,
}

impl State {
    fn live_value(&mut self, key: &str) -> Option<&(Vec<u8>, Option<Instant>)> {
        let expired = self
            .data
            .get(key)
            .is_some_and(|(_, expires_at)| expires_at.is_some_and(|exp| Instant::now() >= exp));
        if expired {
            self.data.remove(key);
        }
        self.data.get(key)
    }
}

/// Fake server shared by every connection a [`FakeConnector`] opens.
pub(crate) struct FakeServer {
    credentials: Option<(Option<String>, String)>,
    state: Mutex<State>,
    connects: AtomicUsize,
    commands: AtomicUsize,
    refuse_connects: AtomicUsize,
    generation: AtomicU64,
}

impl FakeServer {
    pub(crate) fn new() -> Arc<Self> {
        Self::build(None)
    }

    pub(crate) fn with_legacy_password(password: &str) -> Arc<Self> {
        Self::build(Some((None, password.to_string())))
    }

    pub(crate) fn with_acl_user(username: &str, password: &str) -> Arc<Self> {
        Self::build(Some((Some(username.to_string()), password.to_string())))
    }

    fn build(credentials: Option<(Option<String>, String)>) -> Arc<Self> {
        Arc::new(Self {
            credentials,
            state: Mutex::new(State::default()),
            connects: AtomicUsize::new(0),
            commands: AtomicUsize::new(0),
            refuse_connects: AtomicUsize::new(0),
            generation: AtomicU64::new(0),
        })
    }

    pub(crate) fn connector(self: &Arc<Self>) -> Arc<dyn Connector> {
        Arc::new(FakeConnector {
            server: Arc::clone(self),
        })
    }

    /// Opens a connection directly, bypassing connect accounting.
    pub(crate) fn open_connection(self: &Arc<Self>) -> Box<dyn Connection> {
        Box::new(FakeConnection {
            server: Arc::clone(self),
            generation: self.generation.load(Ordering::SeqCst),
            authenticated: self.credentials.is_none(),
        })
    }

    /// Number of connect attempts, refused ones included.
    pub(crate) fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// Number of commands received, AUTH included.
    pub(crate) fn commands(&self) -> usize {
        self.commands.load(Ordering::SeqCst)
    }

    pub(crate) fn auth_log(&self) -> Vec<(Option<String>, String)> {
        self.state().auth_log.clone()
    }

    /// Refuse the next `n` connect attempts.
    pub(crate) fn refuse_next_connects(&self, n: usize) {
        self.refuse_connects.store(n, Ordering::SeqCst);
    }

    pub(crate) fn refuse_all_connects(&self) {
        self.refuse_next_connects(usize::MAX);
    }

    pub(crate) fn set_connect_delay(&self, delay: Duration) {
        self.state().connect_delay = delay;
    }

    pub(crate) fn set_command_delay(&self, delay: Duration) {
        self.state().command_delay = delay;
    }

    /// Kill every open connection, as a server restart would.
    pub(crate) fn drop_connections(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        self.state().live_value(key).is_some()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    fn take_refusal(&self) -> bool {
        self.refuse_connects
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| match n {
                0 => None,
                usize::MAX => Some(usize::MAX),
                n => Some(n - 1),
            })
            .is_ok()
    }

    fn check_credentials(&self, username: Option<&str>, password: &str) -> Result<()> {
        match &self.credentials {
            None => Err(CacheError::Operation(
                "ERR AUTH called without any password configured".to_string(),
            )),
            Some((expected_user, expected_password)) => {
                let user_ok = match (expected_user.as_deref(), username) {
                    (None, None) | (None, Some("default")) => true,
                    (Some(expected), Some(given)) => expected == given,
                    _ => false,
                };
                if user_ok && expected_password == password {
                    Ok(())
                } else {
                    Err(CacheError::Auth(
                        "WRONGPASS invalid username-password pair".to_string(),
                    ))
                }
            }
        }
    }
}

struct FakeConnector {
    server: Arc<FakeServer>,
}

#[async_trait]
impl Connector for FakeConnector {
    async fn connect(&self) -> Result<Box<dyn Connection>> {
        self.server.connects.fetch_add(1, Ordering::SeqCst);

        let delay = self.server.state().connect_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if self.server.take_refusal() {
            return Err(CacheError::Connection("Connection refused".to_string()));
        }
        Ok(self.server.open_connection())
    }

    fn describe(&self) -> String {
        "fake://".to_string()
    }
}

struct FakeConnection {
    server: Arc<FakeServer>,
    generation: u64,
    authenticated: bool,
}

#[async_trait]
impl Connection for FakeConnection {
    async fn execute(&mut self, command: &Command<'_>) -> Result<Reply> {
        let server = Arc::clone(&self.server);
        server.commands.fetch_add(1, Ordering::SeqCst);

        let delay = server.state().command_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if server.generation.load(Ordering::SeqCst) != self.generation {
            return Err(CacheError::Connection(
                "Connection reset by peer".to_string(),
            ));
        }

        if let Command::Auth { username, password } = *command {
            server
                .state()
                .auth_log
                .push((username.map(str::to_string), password.to_string()));
            server.check_credentials(username, password)?;
            self.authenticated = true;
            return Ok(Reply::Ok);
        }

        if !self.authenticated {
            return Err(CacheError::Auth(
                "NOAUTH Authentication required".to_string(),
            ));
        }

        let mut state = server.state();
        let reply = match *command {
            Command::Auth { .. } => Reply::Ok,
            Command::Ping => Reply::Pong,
            Command::Get { key } => Reply::Value(state.live_value(key).map(|(v, _)| v.clone())),
            Command::Set { key, value, ttl } => {
                let expires_at = ttl.map(|ttl| Instant::now() + ttl.max(Duration::from_millis(1)));
                state.data.insert(key.to_string(), (value.to_vec(), expires_at));
                Reply::Ok
            }
            Command::Del { key } => {
                let existed = state.live_value(key).is_some();
                state.data.remove(key);
                Reply::Existed(existed)
            }
            Command::Expire { key, ttl } => {
                let expires_at = Instant::now() + ttl.max(Duration::from_millis(1));
                let existed = state.live_value(key).is_some();
                if let Some(entry) = state.data.get_mut(key) {
                    entry.1 = Some(expires_at);
                }
                Reply::Existed(existed)
            }
        };
        Ok(reply)
    }
}
