// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Storage port for settings documents (keyed by document name).

use crate::key::DocumentKey;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;
use tokio::sync::Mutex;

/// Async key-value port over the persistence backend.
///
/// Values are JSON documents; the backend decides how they are encoded at
/// rest. Operations on one key are issued sequentially by the controller, so
/// implementations need not order concurrent writes to the same key.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Fetch the stored value for `key`. Absent is `Ok(None)`, not an error.
    async fn get(&self, key: &DocumentKey) -> Result<Option<Value>, StoreError>;
    /// Create or overwrite the stored value for `key`.
    async fn set(&self, key: &DocumentKey, value: &Value) -> Result<(), StoreError>;
    /// Delete the stored value for `key`. Removing an absent key is a no-op.
    async fn remove(&self, key: &DocumentKey) -> Result<(), StoreError>;
}

/// Error type for store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O error while reading/writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization failure while encoding a value.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Stored entry exists but is not a decodable document.
    #[error("stored value for {key} is corrupt: {reason}")]
    Corrupt {
        /// Key of the damaged entry.
        key: DocumentKey,
        /// Decoder message.
        reason: String,
    },
    /// Backend could not be reached or initialized.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// In-process store; the default backend for tests and headless sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<DocumentKey, Value>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an entry before handing the store to a controller.
    pub fn with_entry(self, key: DocumentKey, value: Value) -> Self {
        let mut entries = self.entries.into_inner();
        entries.insert(key, value);
        Self {
            entries: Mutex::new(entries),
        }
    }

    /// Copy of every stored entry.
    pub async fn snapshot(&self) -> BTreeMap<DocumentKey, Value> {
        self.entries.lock().await.clone()
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn get(&self, key: &DocumentKey) -> Result<Option<Value>, StoreError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &DocumentKey, value: &Value) -> Result<(), StoreError> {
        self.entries.lock().await.insert(key.clone(), value.clone());
        Ok(())
    }

    async fn remove(&self, key: &DocumentKey) -> Result<(), StoreError> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let store = MemoryStore::new();
        let key = DocumentKey::prefs();
        let value = json!({"analogCutoff": 0.4, "nested": {"list": [3, 1, 2]}});
        store.set(&key, &value).await.unwrap();
        assert_eq!(store.get(&key).await.unwrap(), Some(value));
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let store = MemoryStore::new().with_entry(DocumentKey::bindings(), json!({"buttons": {}}));
        let key = DocumentKey::bindings();
        store.remove(&key).await.unwrap();
        store.remove(&key).await.unwrap();
        assert_eq!(store.get(&key).await.unwrap(), None);
        assert!(store.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn set_overwrites() {
        let store = MemoryStore::new();
        let key = DocumentKey::prefs();
        store.set(&key, &json!(1)).await.unwrap();
        store.set(&key, &json!(2)).await.unwrap();
        assert_eq!(store.get(&key).await.unwrap(), Some(json!(2)));
    }
}
