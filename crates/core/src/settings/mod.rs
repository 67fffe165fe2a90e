//! CMS settings object and its validated form.
//!
//! [`Settings`] mirrors the admin form field for field, using the stored
//! field names (`servername`, `serverport`, `useAclAuth`, ...) so the module
//! data can be deserialized as-is. [`validate`] turns it into an immutable
//! [`Configuration`] before the first connection attempt.

mod types;
mod validation;

use std::env;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::serde::{
    deserialize_checkbox, deserialize_optional_string, deserialize_optional_text, parse_checkbox,
};

pub use types::{connection_url, AuthMode, Configuration, Endpoint};
pub use validation::{validate, ConfigError};

/// Default server address shown in the admin form.
pub const DEFAULT_SERVER: &str = "127.0.0.1";

/// Default Redis TCP port shown in the admin form.
pub const DEFAULT_PORT: &str = "6379";

/// Raw cache settings as supplied by the CMS settings form.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Server ip/hostname, or the socket path when `unix` is set.
    #[serde(
        rename = "servername",
        default = "default_server",
        deserialize_with = "deserialize_optional_string"
    )]
    pub server_name: Option<String>,
    /// Connect through a unix domain socket instead of TCP.
    #[serde(default, deserialize_with = "deserialize_checkbox")]
    pub unix: bool,
    /// TCP port, kept as text because that is how the form stores it.
    #[serde(
        rename = "serverport",
        default = "default_port",
        deserialize_with = "deserialize_optional_text"
    )]
    pub server_port: Option<String>,
    #[serde(default, deserialize_with = "deserialize_checkbox")]
    pub tls: bool,
    #[serde(rename = "useAuth", default, deserialize_with = "deserialize_checkbox")]
    pub use_auth: bool,
    /// Username + password authentication (Redis 6 ACL).
    #[serde(
        rename = "useAclAuth",
        default,
        deserialize_with = "deserialize_checkbox"
    )]
    pub use_acl_auth: bool,
    #[serde(
        rename = "authUser",
        default,
        deserialize_with = "deserialize_optional_string"
    )]
    pub auth_user: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub password: Option<String>,
    /// Caching only happens when this is checked.
    #[serde(
        rename = "cacheactive",
        default,
        deserialize_with = "deserialize_checkbox"
    )]
    pub cache_active: bool,
    /// Namespace prepended to every key.
    #[serde(
        rename = "keyprefix",
        default,
        deserialize_with = "deserialize_optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub key_prefix: Option<String>,
}

fn default_server() -> Option<String> {
    Some(DEFAULT_SERVER.to_string())
}

fn default_port() -> Option<String> {
    Some(DEFAULT_PORT.to_string())
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_name: default_server(),
            unix: false,
            server_port: default_port(),
            tls: false,
            use_auth: false,
            use_acl_auth: false,
            auth_user: None,
            password: None,
            cache_active: false,
            key_prefix: None,
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("server_name", &self.server_name)
            .field("unix", &self.unix)
            .field("server_port", &self.server_port)
            .field("tls", &self.tls)
            .field("use_auth", &self.use_auth)
            .field("use_acl_auth", &self.use_acl_auth)
            .field("auth_user", &self.auth_user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("cache_active", &self.cache_active)
            .field("key_prefix", &self.key_prefix)
            .finish()
    }
}

impl Settings {
    /// Parse settings from the JSON blob the CMS stores for the module.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Malformed(e.to_string()))
    }

    /// Load settings from environment variables.
    ///
    /// Environment variables:
    /// - `REDIS_SERVER` - Host, ip or socket path (default: "127.0.0.1")
    /// - `REDIS_UNIX` - Use a unix socket (default: off)
    /// - `REDIS_PORT` - TCP port (default: "6379")
    /// - `REDIS_TLS` - Use TLS (default: off)
    /// - `REDIS_USE_AUTH` - Authenticate (default: off)
    /// - `REDIS_USE_ACL` - Use ACL username + password (default: off)
    /// - `REDIS_USER` - ACL username
    /// - `REDIS_PASSWORD` - Password
    /// - `REDIS_CACHE_ACTIVE` - Enable caching (default: off)
    /// - `REDIS_KEY_PREFIX` - Key namespace
    pub fn from_env() -> Self {
        let text = |name: &str| env::var(name).ok().filter(|v| !v.trim().is_empty());
        let flag = |name: &str| env::var(name).map(|v| parse_checkbox(&v)).unwrap_or(false);

        Self {
            server_name: text("REDIS_SERVER").or_else(default_server),
            unix: flag("REDIS_UNIX"),
            server_port: text("REDIS_PORT").or_else(default_port),
            tls: flag("REDIS_TLS"),
            use_auth: flag("REDIS_USE_AUTH"),
            use_acl_auth: flag("REDIS_USE_ACL"),
            auth_user: text("REDIS_USER"),
            password: text("REDIS_PASSWORD"),
            cache_active: flag("REDIS_CACHE_ACTIVE"),
            key_prefix: text("REDIS_KEY_PREFIX"),
        }
    }

    /// Validate into an immutable [`Configuration`].
    pub fn validate(&self) -> Result<Configuration, ConfigError> {
        validate(self)
    }
}
