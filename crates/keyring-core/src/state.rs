//! Persistence of the keyring registry.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::account::KeyringState;
use crate::error::KeyringError;

/// Loads and saves the whole registry as one blob.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Returns the persisted state, or an empty registry if nothing was saved yet.
    async fn load(&self) -> Result<KeyringState, KeyringError>;

    async fn save(&self, state: &KeyringState) -> Result<(), KeyringError>;
}

/// Keeps the registry in memory.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    state: Mutex<Option<KeyringState>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: KeyringState) -> Self {
        Self {
            state: Mutex::new(Some(state)),
        }
    }

    /// Last saved state, if any.
    pub async fn saved(&self) -> Option<KeyringState> {
        self.state.lock().await.clone()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn load(&self) -> Result<KeyringState, KeyringError> {
        Ok(self.state.lock().await.clone().unwrap_or_default())
    }

    async fn save(&self, state: &KeyringState) -> Result<(), KeyringError> {
        *self.state.lock().await = Some(state.clone());
        Ok(())
    }
}

/// Stores the registry as a JSON file.
///
/// Saves go to a sibling temp file that is renamed over the target, so a
/// reader never sees a partial write.
#[derive(Debug, Clone)]
pub struct JsonFileStateStore {
    path: PathBuf,
}

impl JsonFileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl StateStore for JsonFileStateStore {
    async fn load(&self) -> Result<KeyringState, KeyringError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| KeyringError::Storage(format!("{}: {e}", self.path.display()))),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no saved state, starting empty");
                Ok(KeyringState::default())
            }
            Err(e) => Err(KeyringError::Storage(format!("{}: {e}", self.path.display()))),
        }
    }

    async fn save(&self, state: &KeyringState) -> Result<(), KeyringError> {
        let json = serde_json::to_vec_pretty(state)
            .map_err(|e| KeyringError::Storage(e.to_string()))?;

        let temp = self.temp_path();
        tokio::fs::write(&temp, json)
            .await
            .map_err(|e| KeyringError::Storage(format!("{}: {e}", temp.display())))?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|e| KeyringError::Storage(format!("{}: {e}", self.path.display())))?;

        debug!(path = %self.path.display(), wallets = state.wallets.len(), "state saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{KeyringAccount, Wallet};
    use mpc_client::RefreshToken;
    use serde_json::Map;

    fn sample_state() -> KeyringState {
        let account = KeyringAccount::new("0x6f83e67551C5eB8E3f684D2D61F46BF739ACB5dC", Map::new());
        let mut state = KeyringState::default();
        state.wallets.insert(
            account.id.clone(),
            Wallet {
                account,
                refresh_token: RefreshToken::new("token"),
            },
        );
        state
    }

    fn temp_state_path() -> PathBuf {
        std::env::temp_dir().join(format!("keyring-state-{}.json", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn memory_store_defaults_to_empty() {
        let store = MemoryStateStore::new();
        assert!(store.load().await.unwrap().wallets.is_empty());
        assert!(store.saved().await.is_none());
    }

    #[tokio::test]
    async fn memory_store_returns_saved_state() {
        let store = MemoryStateStore::new();
        let state = sample_state();
        store.save(&state).await.unwrap();
        assert_eq!(store.load().await.unwrap(), state);
    }

    #[tokio::test]
    async fn file_store_missing_file_is_empty() {
        let store = JsonFileStateStore::new(temp_state_path());
        assert!(store.load().await.unwrap().wallets.is_empty());
    }

    #[tokio::test]
    async fn file_store_persists_across_instances() {
        let path = temp_state_path();
        let state = sample_state();

        JsonFileStateStore::new(&path).save(&state).await.unwrap();
        let loaded = JsonFileStateStore::new(&path).load().await.unwrap();
        assert_eq!(loaded, state);

        let raw: serde_json::Value =
            serde_json::from_slice(&tokio::fs::read(&path).await.unwrap()).unwrap();
        let wallet = raw["wallets"].as_object().unwrap().values().next().unwrap();
        assert_eq!(wallet["refreshToken"], "token");
        assert!(!store_temp_exists(&path));

        tokio::fs::remove_file(&path).await.unwrap();
    }

    fn store_temp_exists(path: &Path) -> bool {
        JsonFileStateStore::new(path).temp_path().exists()
    }

    #[tokio::test]
    async fn file_store_rejects_corrupt_file() {
        let path = temp_state_path();
        tokio::fs::write(&path, b"not json").await.unwrap();
        let err = JsonFileStateStore::new(&path).load().await.unwrap_err();
        assert!(matches!(err, KeyringError::Storage(_)));
        tokio::fs::remove_file(&path).await.unwrap();
    }
}
