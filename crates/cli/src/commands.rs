//! Command execution.

use std::time::Duration;

use poetredis::{CacheClient, Configuration, Lookup, PoolConfig, WriteOutcome};
use poetredis_core::connection_url;
use serde::Serialize;

use crate::cli::{Cli, Commands, OutputFormat};
use crate::error::{CliError, Result};
use crate::output::{format_output, pretty};
use crate::settings::load_settings;

#[derive(Debug, Serialize)]
struct ConfigReport<'a> {
    url: String,
    #[serde(flatten)]
    config: &'a Configuration,
}

#[derive(Debug, Serialize)]
struct ReadReport<'a> {
    key: &'a str,
    result: Lookup<String>,
}

#[derive(Debug, Serialize)]
struct WriteReport<'a> {
    operation: &'a str,
    key: &'a str,
    outcome: WriteOutcome,
}

#[derive(Debug, Serialize)]
struct DisabledReport {
    status: &'static str,
}

const DISABLED: DisabledReport = DisabledReport { status: "disabled" };

/// Run the parsed command and return what should be printed.
///
/// # Errors
///
/// Invalid settings, cache failures, and an unhealthy server on `ping`.
pub async fn run(cli: &Cli) -> Result<String> {
    let settings = load_settings(cli.settings.as_deref(), &cli.connection)?;
    let config = settings.validate()?;

    if matches!(cli.command, Commands::Check) {
        return Ok(check(&config, cli.format));
    }

    let client = CacheClient::new(&config, PoolConfig::default())?;
    execute(&client, &config, &cli.command, cli.format, cli.quiet).await
}

fn check(config: &Configuration, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => format_output(
            &ConfigReport {
                url: connection_url(config),
                config,
            },
            format,
        ),
        OutputFormat::Pretty => pretty::format_config(config),
    }
}

/// Execute a cache command against `client`.
pub async fn execute(
    client: &CacheClient,
    config: &Configuration,
    command: &Commands,
    format: OutputFormat,
    quiet: bool,
) -> Result<String> {
    let json = format == OutputFormat::Json;

    match command {
        Commands::Check => Ok(check(config, format)),
        Commands::Ping => {
            let Some(health) = client.health_check().await else {
                return Ok(disabled(format));
            };
            if !health.healthy {
                let error = health.error.unwrap_or_else(|| "unknown error".to_string());
                return Err(CliError::Unhealthy(error));
            }
            Ok(if json {
                format_output(&health, format)
            } else {
                pretty::format_health(&health)
            })
        }
        Commands::Get { key } => {
            let result = client
                .get(key)
                .await?
                .map(|bytes| String::from_utf8_lossy(&bytes).into_owned());
            Ok(if json {
                format_output(&ReadReport { key, result }, format)
            } else {
                pretty::format_lookup(key, &result)
            })
        }
        Commands::Set { key, value, ttl } => {
            let ttl = ttl.map(Duration::from_secs);
            let outcome = client.set(key, value.as_bytes(), ttl).await?;
            Ok(write_output("set", key, outcome, format, quiet))
        }
        Commands::Del { key } => {
            let outcome = client.delete(key).await?;
            Ok(write_output("del", key, outcome, format, quiet))
        }
        Commands::Expire { key, secs } => {
            let outcome = client.expire(key, Duration::from_secs(*secs)).await?;
            Ok(write_output("expire", key, outcome, format, quiet))
        }
        Commands::Stats => {
            let Some(stats) = client.stats() else {
                return Ok(disabled(format));
            };
            Ok(if json {
                format_output(&stats, format)
            } else {
                pretty::format_stats(&stats)
            })
        }
    }
}

fn write_output(
    operation: &str,
    key: &str,
    outcome: WriteOutcome,
    format: OutputFormat,
    quiet: bool,
) -> String {
    match format {
        OutputFormat::Json => format_output(
            &WriteReport {
                operation,
                key,
                outcome,
            },
            format,
        ),
        OutputFormat::Pretty if quiet => String::new(),
        OutputFormat::Pretty => pretty::format_write(operation, key, outcome),
    }
}

fn disabled(format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => format_output(&DISABLED, format),
        OutputFormat::Pretty => "Cache is disabled (cacheactive is off)".to_string(),
    }
}
