//! Settings resolution for the CLI.

use std::path::Path;

use poetredis_core::Settings;

use crate::cli::ConnectionArgs;
use crate::error::{CliError, Result};

/// Resolve settings from a CMS JSON file when given, otherwise from flags.
pub fn load_settings(path: Option<&Path>, args: &ConnectionArgs) -> Result<Settings> {
    let Some(path) = path else {
        return Ok(args.to_settings());
    };

    let json = std::fs::read_to_string(path).map_err(|source| CliError::SettingsFile {
        path: path.to_path_buf(),
        source,
    })?;
    let settings = Settings::from_json(&json)?;
    tracing::debug!(path = %path.display(), "Loaded settings file");
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn args() -> ConnectionArgs {
        ConnectionArgs {
            server: "flag-host".to_string(),
            port: "6379".to_string(),
            unix: false,
            tls: false,
            user: None,
            password: None,
            acl: false,
            active: false,
            prefix: None,
        }
    }

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("poetredis-{}-{name}", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_flags_used_without_file() {
        let settings = load_settings(None, &args()).unwrap();
        assert_eq!(settings.server_name.as_deref(), Some("flag-host"));
    }

    #[test]
    fn test_file_overrides_flags() {
        let path = temp_file(
            "override.json",
            r#"{"servername": "file-host", "cacheactive": 1}"#,
        );

        let settings = load_settings(Some(&path), &args()).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(settings.server_name.as_deref(), Some("file-host"));
        assert!(settings.cache_active);
    }

    #[test]
    fn test_missing_file() {
        let result = load_settings(Some(Path::new("/nonexistent/redis.json")), &args());
        assert!(matches!(result, Err(CliError::SettingsFile { .. })));
    }

    #[test]
    fn test_malformed_file() {
        let path = temp_file("malformed.json", "{not json");

        let result = load_settings(Some(&path), &args());
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(result, Err(CliError::Settings(_))));
    }
}
