//! Settings validation.
//!
//! The admin form hides fields with `showIf` rules; here those rules become
//! predicates. Fields hidden by the form are ignored, never rejected.

use thiserror::Error;

use super::types::{AuthMode, Configuration, Endpoint};
use super::Settings;

/// Reasons a settings object cannot be used to connect.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("server name or socket path is required")]
    MissingServer,

    #[error("invalid port '{0}': expected a number between 1 and 65535")]
    InvalidPort(String),

    #[error("ACL authentication requires a username")]
    MissingUsername,

    #[error("authentication is enabled but no password is set")]
    MissingPassword,

    #[error("TLS cannot be used with a unix socket")]
    TlsOverUnixSocket,

    #[error("key prefix must not contain whitespace")]
    InvalidKeyPrefix,

    #[error("malformed settings: {0}")]
    Malformed(String),
}

/// Validate raw settings into a [`Configuration`].
///
/// Pure function: no side effects, no I/O.
pub fn validate(settings: &Settings) -> Result<Configuration, ConfigError> {
    let server = settings
        .server_name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(ConfigError::MissingServer)?;

    let endpoint = if settings.unix {
        // Port field is hidden in unix mode, so whatever it holds is ignored.
        if settings.tls {
            return Err(ConfigError::TlsOverUnixSocket);
        }
        Endpoint::Unix {
            path: server.to_string(),
        }
    } else {
        Endpoint::Tcp {
            host: server.to_string(),
            port: parse_port(settings.server_port.as_deref())?,
        }
    };

    let auth = validate_auth(settings)?;

    let key_prefix = match settings.key_prefix.as_deref().map(str::trim) {
        Some(prefix) if prefix.chars().any(char::is_whitespace) => {
            return Err(ConfigError::InvalidKeyPrefix)
        }
        Some(prefix) if !prefix.is_empty() => Some(prefix.to_string()),
        _ => None,
    };

    Ok(Configuration {
        endpoint,
        tls: settings.tls,
        auth,
        active: settings.cache_active,
        key_prefix,
    })
}

fn parse_port(raw: Option<&str>) -> Result<u16, ConfigError> {
    let raw = raw.map(str::trim).unwrap_or_default();
    match raw.parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(ConfigError::InvalidPort(raw.to_string())),
    }
}

fn validate_auth(settings: &Settings) -> Result<AuthMode, ConfigError> {
    if !settings.use_auth {
        return Ok(AuthMode::None);
    }

    let password = settings
        .password
        .clone()
        .ok_or(ConfigError::MissingPassword)?;

    if !settings.use_acl_auth {
        return Ok(AuthMode::Legacy { password });
    }

    let username = settings
        .auth_user
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or(ConfigError::MissingUsername)?;

    Ok(AuthMode::Acl {
        username: username.to_string(),
        password,
    })
}
