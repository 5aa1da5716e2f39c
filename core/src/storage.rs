//! Key-value storage the session is read from.
//!
//! # Design
//! The session reader only needs `get(key)`. Every failure inside a storage
//! backend (missing file, bad JSON, poisoned lock) reads as "absent" so the
//! reader stays total.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use serde_json::Value;
use tracing::{debug, warn};

/// Read-only access to client-local persistent storage.
pub trait SessionStorage: Send + Sync {
    /// Raw string stored under `key`, or `None` when absent.
    fn get(&self, key: &str) -> Option<String>;
}

impl<T: SessionStorage + ?Sized> SessionStorage for Arc<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }
}

/// In-process storage. Writes are visible to subsequent reads, so a host can
/// simulate login and logout against a live client.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, key: &str, value: impl Into<String>) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key.to_string(), value.into());
        }
    }

    pub fn remove(&self, key: &str) {
        if let Ok(mut entries) = self.entries.write() {
            entries.remove(key);
        }
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().ok()?.get(key).cloned()
    }
}

/// Storage backed by a JSON object file, e.g. `{"session": "{\"token\":\"..\"}"}`.
///
/// The file is re-read on every `get`; nothing is cached.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "storage file does not exist");
                return None;
            }
            Err(e) => {
                warn!(path = %self.path.display(), "failed to read storage file: {e}");
                return None;
            }
        };

        let document: Value = match serde_json::from_str(&contents) {
            Ok(document) => document,
            Err(e) => {
                warn!(path = %self.path.display(), "storage file is not valid JSON: {e}");
                return None;
            }
        };

        match document.get(key)? {
            Value::String(value) => Some(value.clone()),
            _ => {
                warn!(path = %self.path.display(), key, "storage entry is not a string");
                None
            }
        }
    }
}
