//! CLI command definitions.

mod connection;

pub use connection::ConnectionArgs;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Operator CLI for the poetredis cache.
#[derive(Debug, Parser)]
#[command(name = "poetredis")]
#[command(about = "Inspect and exercise the Redis page cache", long_about = None)]
pub struct Cli {
    /// JSON settings object as stored by the CMS. Overrides the connection flags.
    #[arg(long, global = true, env = "REDIS_SETTINGS")]
    pub settings: Option<PathBuf>,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Output format.
    #[arg(long, global = true, default_value = "pretty")]
    pub format: OutputFormat,

    /// Suppress non-essential output.
    #[arg(long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Raw JSON output.
    Json,
    /// Human-readable output.
    #[default]
    Pretty,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Validate the settings and print the effective configuration.
    Check,
    /// Connect, authenticate and PING the server.
    Ping,
    /// Read a key.
    Get { key: String },
    /// Store a value.
    Set {
        key: String,
        value: String,
        /// Time to live in seconds. Omit for no expiry.
        #[arg(long)]
        ttl: Option<u64>,
    },
    /// Delete a key.
    Del { key: String },
    /// Set a key's time to live in seconds.
    Expire { key: String, secs: u64 },
    /// Connection pool statistics.
    Stats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_set_with_ttl() {
        let cli = Cli::try_parse_from(["poetredis", "set", "page:1", "<html>", "--ttl", "60"])
            .unwrap();

        match cli.command {
            Commands::Set { key, value, ttl } => {
                assert_eq!(key, "page:1");
                assert_eq!(value, "<html>");
                assert_eq!(ttl, Some(60));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["poetredis", "get", "k", "--format", "json", "--quiet"])
            .unwrap();

        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.quiet);
    }

    #[test]
    fn test_expire_requires_seconds() {
        assert!(Cli::try_parse_from(["poetredis", "expire", "k"]).is_err());
    }

    #[test]
    fn test_settings_path() {
        let cli = Cli::try_parse_from(["poetredis", "--settings", "/etc/cms/redis.json", "check"])
            .unwrap();

        assert_eq!(cli.settings, Some(PathBuf::from("/etc/cms/redis.json")));
    }
}
