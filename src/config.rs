//! Configuration loader for the credential CLI. The file is JSON with the same
//! camelCase keys the rest of the app uses for its settings.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

const DEFAULT_DEBUG_LEVEL: &str = "info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file unreadable: {0}")]
    Io(String),
    #[error("config parse failed: {0}")]
    Parse(String),
    #[error("accountsPath must not be empty")]
    MissingAccountsPath,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(rename = "accountsPath")]
    accounts_path: PathBuf,
    #[serde(rename = "debugLevel")]
    debug_level: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// JSON file holding the account records.
    pub accounts_path: PathBuf,
    /// `tracing` filter directive, e.g. `info` or `flashcard_credentials=debug`.
    pub debug_level: String,
}

/// Loads the JSON configuration file. A relative `accountsPath` is resolved
/// against the directory containing the config file.
pub fn load_config(path: impl AsRef<Path>) -> Result<RuntimeConfig, ConfigError> {
    let path = path.as_ref();
    let raw_json = fs::read_to_string(path).map_err(|e| ConfigError::Io(format!("{e}")))?;
    let raw: RawConfig =
        serde_json::from_str(&raw_json).map_err(|e| ConfigError::Parse(format!("{e}")))?;

    if raw.accounts_path.as_os_str().is_empty() {
        return Err(ConfigError::MissingAccountsPath);
    }

    let accounts_path = if raw.accounts_path.is_relative() {
        path.parent()
            .map(|dir| dir.join(&raw.accounts_path))
            .unwrap_or(raw.accounts_path)
    } else {
        raw.accounts_path
    };

    Ok(RuntimeConfig {
        accounts_path,
        debug_level: raw
            .debug_level
            .filter(|level| !level.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DEBUG_LEVEL.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::{load_config, ConfigError};
    use serde_json::json;
    use std::fs;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn loads_config_and_resolves_relative_path() {
        let dir = tempdir().expect("temp dir");
        let config_path = dir.path().join("config.json");
        let payload = json!({
            "accountsPath": "accounts.json",
            "debugLevel": "debug"
        });
        fs::write(&config_path, serde_json::to_vec(&payload).unwrap()).unwrap();

        let config = load_config(&config_path).expect("config should load");
        assert_eq!(config.accounts_path, dir.path().join("accounts.json"));
        assert_eq!(config.debug_level, "debug");
    }

    #[test]
    fn defaults_debug_level() {
        let file = NamedTempFile::new().expect("temp file");
        fs::write(file.path(), r#"{ "accountsPath": "/var/lib/cards/accounts.json" }"#).unwrap();

        let config = load_config(file.path()).expect("config should load");
        assert_eq!(config.debug_level, "info");
        assert!(config.accounts_path.ends_with("accounts.json"));
    }

    #[test]
    fn reports_bad_files() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), "{ not json").unwrap();
        assert!(matches!(load_config(file.path()), Err(ConfigError::Parse(_))));

        fs::write(file.path(), r#"{ "accountsPath": "" }"#).unwrap();
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::MissingAccountsPath)
        ));

        let missing = file.path().with_extension("absent");
        assert!(matches!(load_config(missing), Err(ConfigError::Io(_))));
    }
}
