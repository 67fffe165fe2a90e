//! Connection flags mirroring the CMS settings form.

use clap::builder::FalseyValueParser;
use clap::Args;
use poetredis_core::Settings;

/// Redis connection flags. Each one can also come from its `REDIS_*` variable.
#[derive(Debug, Clone, Args)]
pub struct ConnectionArgs {
    /// Server ip/hostname, or the socket path with --unix.
    #[arg(long, global = true, env = "REDIS_SERVER", default_value = "127.0.0.1")]
    pub server: String,

    /// TCP port. Ignored with --unix.
    #[arg(long, global = true, env = "REDIS_PORT", default_value = "6379")]
    pub port: String,

    /// Connect through a unix domain socket.
    #[arg(long, global = true, env = "REDIS_UNIX", value_parser = FalseyValueParser::new())]
    pub unix: bool,

    /// Connect with TLS.
    #[arg(long, global = true, env = "REDIS_TLS", value_parser = FalseyValueParser::new())]
    pub tls: bool,

    /// ACL username. Implies --acl.
    #[arg(long, global = true, env = "REDIS_USER")]
    pub user: Option<String>,

    /// Password. Enables authentication.
    #[arg(long, global = true, env = "REDIS_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Authenticate with username + password (Redis 6 ACL).
    #[arg(long, global = true, env = "REDIS_USE_ACL", value_parser = FalseyValueParser::new())]
    pub acl: bool,

    /// Treat the cache as active. Without it every command reports "disabled".
    #[arg(long, global = true, env = "REDIS_CACHE_ACTIVE", value_parser = FalseyValueParser::new())]
    pub active: bool,

    /// Namespace prepended to every key.
    #[arg(long, global = true, env = "REDIS_KEY_PREFIX")]
    pub prefix: Option<String>,
}

impl ConnectionArgs {
    /// Build the settings object the CMS form would have produced.
    pub fn to_settings(&self) -> Settings {
        let use_acl_auth = self.acl || self.user.is_some();
        Settings {
            server_name: Some(self.server.clone()),
            unix: self.unix,
            server_port: Some(self.port.clone()),
            tls: self.tls,
            use_auth: self.password.is_some() || use_acl_auth,
            use_acl_auth,
            auth_user: self.user.clone(),
            password: self.password.clone(),
            cache_active: self.active,
            key_prefix: self.prefix.clone(),
        }
    }
}
