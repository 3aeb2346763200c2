use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use keyring::Entry;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{Config, TokenBackend};

/// Token file name in the data directory
const TOKEN_FILE: &str = "session.json";

const KEYRING_SERVICE: &str = "opsdeck";
const KEYRING_ACCOUNT: &str = "access-token";

/// Durable slot holding the access token between runs.
///
/// Implementations must treat `clear` on an empty slot as success.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<String>>;
    fn save(&self, token: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// Build the store selected by the configuration.
pub fn token_store_for(config: &Config) -> Result<Arc<dyn TokenStore>> {
    Ok(match config.token_backend {
        TokenBackend::File => Arc::new(FileTokenStore::new(config.data_dir()?)),
        TokenBackend::Keyring => Arc::new(KeyringTokenStore),
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredToken {
    pub token: String,
    pub saved_at: DateTime<Utc>,
}

/// Token persisted as JSON in the data directory.
pub struct FileTokenStore {
    dir: PathBuf,
}

impl FileTokenStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn token_path(&self) -> PathBuf {
        self.dir.join(TOKEN_FILE)
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>> {
        let path = self.token_path();
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path).context("Failed to read token file")?;
        let stored: StoredToken =
            serde_json::from_str(&contents).context("Failed to parse token file")?;
        debug!(saved_at = %stored.saved_at, "Loaded stored token");
        Ok(Some(stored.token).filter(|t| !t.is_empty()))
    }

    fn save(&self, token: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir).context("Failed to create data directory")?;
        let stored = StoredToken {
            token: token.to_string(),
            saved_at: Utc::now(),
        };
        let contents = serde_json::to_string_pretty(&stored)?;
        std::fs::write(self.token_path(), contents).context("Failed to write token file")?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let path = self.token_path();
        if path.exists() {
            std::fs::remove_file(path).context("Failed to remove token file")?;
        }
        Ok(())
    }
}

/// Token persisted in the OS keychain.
pub struct KeyringTokenStore;

impl KeyringTokenStore {
    fn entry() -> Result<Entry> {
        Entry::new(KEYRING_SERVICE, KEYRING_ACCOUNT).context("Failed to create keyring entry")
    }
}

impl TokenStore for KeyringTokenStore {
    fn load(&self) -> Result<Option<String>> {
        match Self::entry()?.get_password() {
            Ok(token) => Ok(Some(token).filter(|t| !t.is_empty())),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to read token from keychain"),
        }
    }

    fn save(&self, token: &str) -> Result<()> {
        Self::entry()?
            .set_password(token)
            .context("Failed to store token in keychain")
    }

    fn clear(&self) -> Result<()> {
        match Self::entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete token from keychain"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("opsdeck"));

        assert_eq!(store.load().unwrap(), None);

        store.save("abc123").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("abc123"));

        store.save("def456").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("def456"));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_file_store_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().to_path_buf());
        store.clear().unwrap();
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_file_store_empty_token_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().to_path_buf());
        store.save("").unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_file_store_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(TOKEN_FILE), "{").unwrap();
        let store = FileTokenStore::new(dir.path().to_path_buf());
        assert!(store.load().is_err());
    }
}
