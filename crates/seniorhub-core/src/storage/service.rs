use std::sync::Arc;

use anyhow::Result;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error, info, warn};

use crate::config::{Config, StorageBackend};

use super::{FileStore, KeyValueStore, KeyringStore, MemoryStore};

/// The fixed keys this application persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    AuthUser,
    AuthToken,
    HouseholdStatus,
}

impl StorageKey {
    pub const ALL: [StorageKey; 3] = [
        StorageKey::AuthUser,
        StorageKey::AuthToken,
        StorageKey::HouseholdStatus,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::AuthUser => "seniorhub_auth_user",
            StorageKey::AuthToken => "seniorhub_auth_token",
            StorageKey::HouseholdStatus => "seniorhub_household_status",
        }
    }
}

/// Best-effort JSON persistence over a `KeyValueStore`.
///
/// Clone is cheap; clones share the backend.
#[derive(Clone)]
pub struct StorageService {
    store: Arc<dyn KeyValueStore>,
}

impl StorageService {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Build the backend selected by `SENIORHUB_STORAGE`
    pub fn from_config(config: &Config) -> Result<Self> {
        let store: Arc<dyn KeyValueStore> = match config.storage_backend {
            StorageBackend::File => Arc::new(FileStore::new(config.data_dir()?)),
            StorageBackend::Keyring => Arc::new(KeyringStore::new()),
            StorageBackend::Memory => Arc::new(MemoryStore::new()),
        };
        info!(backend = ?config.storage_backend, "Session storage configured");
        Ok(Self::new(store))
    }

    /// Serialize `data` and write it under `key`. Failures are logged, not returned;
    /// the result only says whether the value was written.
    pub fn save<T: Serialize + ?Sized>(&self, key: StorageKey, data: &T) -> bool {
        let serialized = match serde_json::to_string(data) {
            Ok(s) => s,
            Err(e) => {
                error!(key = key.as_str(), error = %e, "Failed to serialize storage value");
                return false;
            }
        };
        match self.store.set(key.as_str(), &serialized) {
            Ok(()) => true,
            Err(e) => {
                error!(key = key.as_str(), error = %e, "Failed to save storage value");
                false
            }
        }
    }

    /// Read and parse the value under `key`.
    /// Absent, empty, unreadable and unparsable values are all `None`.
    pub fn load<T: DeserializeOwned>(&self, key: StorageKey) -> Option<T> {
        let raw = match self.store.get(key.as_str()) {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => return None,
            Err(e) => {
                error!(key = key.as_str(), error = %e, "Failed to load storage value");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key = key.as_str(), error = %e, "Discarding unparsable storage value");
                None
            }
        }
    }

    pub fn remove(&self, key: StorageKey) {
        if let Err(e) = self.store.remove(key.as_str()) {
            error!(key = key.as_str(), error = %e, "Failed to remove storage value");
        }
    }

    /// Remove every key this application owns. A failing key does not stop the rest.
    pub fn clear(&self) {
        for key in StorageKey::ALL {
            self.remove(key);
        }
        debug!("Storage cleared");
    }
}
