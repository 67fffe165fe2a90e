//! Pretty output formatting.

use poetredis::{HealthStatus, PoolStats};
use poetredis_core::{connection_url, Configuration, Endpoint, Lookup, WriteOutcome};

/// Format the effective configuration. Secrets are never shown.
pub fn format_config(config: &Configuration) -> String {
    let endpoint = match config.endpoint() {
        Endpoint::Tcp { host, port } => format!("tcp {host}:{port}"),
        Endpoint::Unix { path } => format!("unix {path}"),
    };
    let mut output = format!(
        "CONFIGURATION\n  URL: {}\n  Endpoint: {}\n  TLS: {}\n  Auth: {}",
        connection_url(config),
        endpoint,
        yes_no(config.use_tls()),
        config.auth_mode().name()
    );
    if let Some(user) = config.username() {
        output.push_str(&format!("\n  User: {user}"));
    }
    if let Some(prefix) = config.key_prefix() {
        output.push_str(&format!("\n  Key prefix: {prefix}"));
    }
    output.push_str(&format!("\n  Active: {}", yes_no(config.is_active())));
    output
}

/// Format a read result.
pub fn format_lookup(key: &str, lookup: &Lookup<String>) -> String {
    match lookup {
        Lookup::Hit(value) => value.clone(),
        Lookup::Miss => format!("{key}: (miss)"),
        Lookup::Disabled => format!("{key}: (cache disabled)"),
    }
}

/// Format a write result.
pub fn format_write(operation: &str, key: &str, outcome: WriteOutcome) -> String {
    match outcome {
        WriteOutcome::Applied => format!("{operation} {key}: OK"),
        WriteOutcome::Missing => format!("{operation} {key}: key does not exist"),
        WriteOutcome::Disabled => format!("{operation} {key}: (cache disabled)"),
    }
}

/// Format a health check result.
pub fn format_health(health: &HealthStatus) -> String {
    let mut output = format!(
        "Redis Health:\n  Status: {}\n  Endpoint: {}\n  Latency: {}ms",
        if health.healthy { "healthy" } else { "unhealthy" },
        health.endpoint,
        health.latency_ms
    );
    if let Some(error) = &health.error {
        output.push_str(&format!("\n  Error: {error}"));
    }
    output
}

/// Format pool statistics.
pub fn format_stats(stats: &PoolStats) -> String {
    format!(
        "Pool Stats:\n  Max size: {}\n  Idle: {}\n  In use: {}\n  Opened: {}",
        stats.max_size, stats.idle, stats.in_use, stats.opened_total
    )
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
