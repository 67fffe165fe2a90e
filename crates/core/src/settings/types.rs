use std::fmt;

use serde::Serialize;

/// Where the Redis server listens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Endpoint {
    Tcp { host: String, port: u16 },
    Unix { path: String },
}

/// How a new connection authenticates before first use.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthMode {
    None,
    /// Single shared password (`requirepass`).
    Legacy { password: String },
    /// Redis 6+ ACL username + password.
    Acl { username: String, password: String },
}

impl AuthMode {
    /// Short name used in logs and CLI output.
    pub fn name(&self) -> &'static str {
        match self {
            AuthMode::None => "none",
            AuthMode::Legacy { .. } => "legacy",
            AuthMode::Acl { .. } => "acl",
        }
    }
}

impl fmt::Debug for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMode::None => f.write_str("None"),
            AuthMode::Legacy { .. } => f
                .debug_struct("Legacy")
                .field("password", &"<redacted>")
                .finish(),
            AuthMode::Acl { username, .. } => f
                .debug_struct("Acl")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

impl Serialize for AuthMode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("AuthMode", 2)?;
        state.serialize_field("mode", self.name())?;
        match self {
            AuthMode::Acl { username, .. } => state.serialize_field("username", username)?,
            _ => state.skip_field("username")?,
        }
        state.end()
    }
}

/// Validated, immutable cache configuration.
///
/// Built only through [`validate`](super::validate). Reconfiguring means
/// validating new settings and building a new client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Configuration {
    pub(crate) endpoint: Endpoint,
    pub(crate) tls: bool,
    pub(crate) auth: AuthMode,
    pub(crate) active: bool,
    pub(crate) key_prefix: Option<String>,
}

impl Configuration {
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Host name, ip, or socket path.
    pub fn server_address(&self) -> &str {
        match &self.endpoint {
            Endpoint::Tcp { host, .. } => host,
            Endpoint::Unix { path } => path,
        }
    }

    pub fn is_unix_socket(&self) -> bool {
        matches!(self.endpoint, Endpoint::Unix { .. })
    }

    /// TCP port, `None` for unix sockets.
    pub fn port(&self) -> Option<u16> {
        match self.endpoint {
            Endpoint::Tcp { port, .. } => Some(port),
            Endpoint::Unix { .. } => None,
        }
    }

    pub fn use_tls(&self) -> bool {
        self.tls
    }

    pub fn auth_mode(&self) -> &AuthMode {
        &self.auth
    }

    /// ACL username; only present in ACL mode.
    pub fn username(&self) -> Option<&str> {
        match &self.auth {
            AuthMode::Acl { username, .. } => Some(username),
            _ => None,
        }
    }

    pub fn password(&self) -> Option<&str> {
        match &self.auth {
            AuthMode::None => None,
            AuthMode::Legacy { password } | AuthMode::Acl { password, .. } => Some(password),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn key_prefix(&self) -> Option<&str> {
        self.key_prefix.as_deref()
    }
}

/// Builds the credential-free connection URL for a configuration.
///
/// Credentials are never embedded; they are sent by the auth handshake.
pub fn connection_url(config: &Configuration) -> String {
    match &config.endpoint {
        Endpoint::Unix { path } => format!("redis+unix://{path}"),
        Endpoint::Tcp { host, port } => {
            let scheme = if config.tls { "rediss" } else { "redis" };
            if host.contains(':') && !host.starts_with('[') {
                format!("{scheme}://[{host}]:{port}/")
            } else {
                format!("{scheme}://{host}:{port}/")
            }
        }
    }
}
