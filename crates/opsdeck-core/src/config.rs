//! Application configuration management.
//!
//! This module handles loading and saving the client configuration: the
//! backend base URL, the request timeout, where the access token is kept,
//! and the last used username.
//!
//! Configuration is stored at `~/.config/opsdeck/config.json`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Application name used for config/data directory paths
const APP_NAME: &str = "opsdeck";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Backend mounts every router under `/api`.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";

/// HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Environment variable overriding `api_base_url`
pub const API_URL_ENV: &str = "OPSDECK_API_URL";

/// Where the access token is persisted between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TokenBackend {
    /// `session.json` in the data directory
    #[default]
    File,
    /// OS keychain
    Keyring,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub token_backend: TokenBackend,
    pub last_username: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            token_backend: TokenBackend::default(),
            last_username: None,
        }
    }
}

impl Config {
    /// Load from the default location, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_env();
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents).context("Failed to parse config file")
        } else {
            debug!(path = %path.display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api_base_url = url;
            }
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for the token file and log files.
    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.token_backend, TokenBackend::File);
        assert!(config.last_username.is_none());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"token_backend": "keyring", "last_username": "admin"}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.token_backend, TokenBackend::Keyring);
        assert_eq!(config.last_username.as_deref(), Some("admin"));
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            api_base_url: "https://ops.example.com/api".to_string(),
            request_timeout_secs: 5,
            ..Config::default()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.api_base_url, "https://ops.example.com/api");
        assert_eq!(loaded.request_timeout_secs, 5);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
