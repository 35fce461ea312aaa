pub mod json_store;

use crate::error::AppError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use tracing::{debug, warn};

pub use json_store::JsonFileStore;

/// Fixed identifiers of every persisted blob.
pub mod keys {
    pub const TODOS: &str = "nova-todos-v4";
    pub const LEGACY_TODOS: &str = "nova-todos-v3";
    pub const COMPLETED: &str = "nova-completed";
    pub const NOTES: &str = "nova-notes-v2";
    pub const LANGUAGE: &str = "nova-language";
    pub const THEME: &str = "nova-theme";
}

/// Raw string key-value backend.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError>;
    fn set(&mut self, key: &str, value: String) -> Result<(), AppError>;
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), AppError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// Typed JSON layer over a [`KeyValueStore`].
///
/// Writes are best effort: a failed write is logged and otherwise ignored.
/// Reads treat a missing or unparseable blob the same way.
#[derive(Debug)]
pub struct Storage<S> {
    backend: S,
}

impl<S: KeyValueStore> Storage<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn save<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) {
        let content = match serde_json::to_string(value) {
            Ok(content) => content,
            Err(err) => {
                warn!(key, error = %err, "failed to serialize value");
                return;
            }
        };

        match self.backend.set(key, content) {
            Ok(()) => debug!(key, "saved"),
            Err(err) => warn!(key, error = %err, "failed to persist value"),
        }
    }

    /// `None` when the key is absent or its blob does not parse as `T`.
    pub fn try_load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.backend.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                warn!(key, error = %err, "failed to read value");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(key, error = %err, "ignoring malformed value");
                None
            }
        }
    }

    pub fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.try_load(key).unwrap_or(default)
    }
}
