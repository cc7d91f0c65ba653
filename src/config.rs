//! Backend connection configuration.
//!
//! A small TOML file in the platform config directory plus a single
//! environment override for the base URL. Missing file means defaults;
//! a malformed file is an error rather than a silent fallback.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable overriding the configured base URL.
pub const BASE_URL_ENV: &str = "SENTILENS_API_URL";

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Settings for talking to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Backend base URL, e.g. `http://localhost:8000`.
    pub base_url: String,
    /// Budget for predict/validate calls, in seconds.
    pub long_request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            long_request_timeout_secs: 30 * 60,
        }
    }
}

impl ApiConfig {
    /// Load from the platform config directory, then apply the env
    /// override. A missing file yields defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match config_file_path() {
            Some(path) if path.is_file() => Self::load_from_path(&path)?,
            _ => Self::default(),
        };
        if let Ok(base_url) = std::env::var(BASE_URL_ENV)
            && !base_url.trim().is_empty()
        {
            config.base_url = base_url.trim().to_string();
        }
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn config_file_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "sentilens")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn parses_partial_config_with_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "base_url = \"http://10.0.0.5:8000\"\n").unwrap();
        let config = ApiConfig::load_from_path(&path).unwrap();
        assert_eq!(config.base_url, "http://10.0.0.5:8000");
        assert_eq!(config.long_request_timeout_secs, 1800);
    }

    #[test]
    fn malformed_config_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "base_url = [broken\n").unwrap();
        assert!(matches!(
            ApiConfig::load_from_path(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn defaults_point_at_localhost() {
        let config = ApiConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
    }
}
