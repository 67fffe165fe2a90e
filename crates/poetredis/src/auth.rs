//! Authentication handshake for new connections.

use poetredis_core::{AuthMode, CacheError, Configuration, Result};

use crate::connection::{Command, Connection};

/// Applies the configured `AUTH` handshake to a freshly opened connection.
///
/// Runs exactly once per connection, before the pool hands it out.
#[derive(Debug, Clone)]
pub struct AuthNegotiator {
    mode: AuthMode,
}

impl AuthNegotiator {
    pub fn new(mode: AuthMode) -> Self {
        Self { mode }
    }

    pub fn from_config(config: &Configuration) -> Self {
        Self::new(config.auth_mode().clone())
    }

    pub fn mode(&self) -> &AuthMode {
        &self.mode
    }

    /// Authenticate `conn`.
    ///
    /// `None` sends nothing, `Legacy` sends `AUTH password`, `Acl` sends
    /// `AUTH username password`.
    ///
    /// # Errors
    ///
    /// `CacheError::Auth` if the server rejects the credentials,
    /// `CacheError::Connection` if the transport fails mid-handshake.
    pub async fn negotiate(&self, conn: &mut dyn Connection) -> Result<()> {
        let command = match &self.mode {
            AuthMode::None => return Ok(()),
            AuthMode::Legacy { password } => Command::Auth {
                username: None,
                password: password.as_str(),
            },
            AuthMode::Acl { username, password } => Command::Auth {
                username: Some(username.as_str()),
                password: password.as_str(),
            },
        };

        match conn.execute(&command).await {
            Ok(_) => {
                tracing::debug!(mode = self.mode.name(), "Redis authentication succeeded");
                Ok(())
            }
            Err(err) if err.is_connection() => Err(err),
            Err(err) => {
                tracing::warn!(mode = self.mode.name(), error = %err, "Redis authentication rejected");
                Err(into_auth_error(err))
            }
        }
    }
}

fn into_auth_error(err: CacheError) -> CacheError {
    match err {
        CacheError::Auth(_) => err,
        other => CacheError::Auth(other.to_string()),
    }
}
