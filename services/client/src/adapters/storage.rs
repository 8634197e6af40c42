//! services/client/src/adapters/storage.rs
//!
//! Key-value storage adapters implementing the `KeyValueStore` port: a
//! JSON-file-backed store for the durable tier and an in-memory store for the
//! session-scoped tier. Per the storage contract, write failures are logged
//! and swallowed; reads of anything unreadable answer `None`.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use study_assistant_core::ports::KeyValueStore;
use tracing::warn;

//=========================================================================================
// Durable Tier: JsonFileStore
//=========================================================================================

/// A flat string map persisted to one JSON file. Every mutation rewrites the
/// file; the map is small (a token, a user blob, a selection array).
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl JsonFileStore {
    /// Opens the store, loading any existing file. A missing or corrupt file
    /// starts the store empty.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = fs::read_to_string(&path)
            .ok()
            .and_then(|raw| serde_json::from_str::<HashMap<String, String>>(&raw).ok())
            .unwrap_or_default();
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    fn flush(&self, entries: &HashMap<String, String>) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                warn!("Failed to create storage directory {:?}: {}", parent, e);
                return;
            }
        }
        match serde_json::to_string_pretty(entries) {
            Ok(raw) => {
                if let Err(e) = fs::write(&self.path, raw) {
                    warn!("Failed to persist storage file {:?}: {}", self.path, e);
                }
            }
            Err(e) => warn!("Failed to serialize storage entries: {}", e),
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn put(&self, key: &str, value: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
            self.flush(&entries);
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            if entries.remove(key).is_some() {
                self.flush(&entries);
            }
        }
    }
}

//=========================================================================================
// Session Tier: MemoryStore
//=========================================================================================

/// A process-lifetime map, the analogue of session-scoped browser storage.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn put(&self, key: &str, value: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(key);
        }
    }
}
