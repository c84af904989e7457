// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(dead_code)]

use async_trait::async_trait;
use gamepad_settings_core::{DocumentKey, MemoryStore, SettingsStore, StoreError};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// One call observed by [`RecordingStore`].
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Get(String),
    Set(String, Value),
    Remove(String),
}

/// Store double that records every call and can be told to fail.
#[derive(Debug, Default)]
pub struct RecordingStore {
    inner: MemoryStore,
    ops: Mutex<Vec<Op>>,
    failing_reads: Mutex<HashSet<String>>,
    corrupt: Mutex<HashSet<String>>,
    fail_writes: AtomicBool,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(key: &str, value: Value) -> Self {
        Self {
            inner: MemoryStore::new().with_entry(DocumentKey::new(key).unwrap(), value),
            ..Self::default()
        }
    }

    pub fn fail_reads_for(&self, key: &str) {
        self.failing_reads.lock().unwrap().insert(key.to_owned());
    }

    pub fn corrupt(&self, key: &str) {
        self.corrupt.lock().unwrap().insert(key.to_owned());
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn ops(&self) -> Vec<Op> {
        self.ops.lock().unwrap().clone()
    }

    /// Every call except reads.
    pub fn writes(&self) -> Vec<Op> {
        self.ops()
            .into_iter()
            .filter(|op| !matches!(op, Op::Get(_)))
            .collect()
    }

    pub async fn stored(&self, key: &str) -> Option<Value> {
        self.inner.get(&DocumentKey::new(key).unwrap()).await.unwrap()
    }

    fn record(&self, op: Op) {
        self.ops.lock().unwrap().push(op);
    }

    fn check_write(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Io(std::io::Error::other("quota exceeded")));
        }
        Ok(())
    }
}

#[async_trait]
impl SettingsStore for RecordingStore {
    async fn get(&self, key: &DocumentKey) -> Result<Option<Value>, StoreError> {
        self.record(Op::Get(key.to_string()));
        if self.failing_reads.lock().unwrap().contains(key.as_str()) {
            return Err(StoreError::Unavailable(String::from("storage offline")));
        }
        if self.corrupt.lock().unwrap().contains(key.as_str()) {
            return Err(StoreError::Corrupt {
                key: key.clone(),
                reason: String::from("expected value at line 1 column 1"),
            });
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &DocumentKey, value: &Value) -> Result<(), StoreError> {
        self.record(Op::Set(key.to_string(), value.clone()));
        self.check_write()?;
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &DocumentKey) -> Result<(), StoreError> {
        self.record(Op::Remove(key.to_string()));
        self.check_write()?;
        self.inner.remove(key).await
    }
}
