// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Built-in default value of every registered document.

use crate::key::DocumentKey;
use crate::schema::{GamepadBindings, GamepadPrefs};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Immutable map from document key to its default, held in persisted form.
#[derive(Debug, Clone, Default)]
pub struct DefaultsRegistry {
    entries: BTreeMap<DocumentKey, Value>,
}

impl DefaultsRegistry {
    /// Empty registry; use [`DefaultsRegistry::with`] to populate it.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry shipped with the navigator: preferences and bindings.
    pub fn gamepad() -> Self {
        Self::new()
            .with(DocumentKey::prefs(), &GamepadPrefs::default())
            .with(DocumentKey::bindings(), &GamepadBindings::default())
    }

    /// Register (or replace) the default for `key`.
    ///
    /// Defaults are compiled-in values; one that cannot be represented as
    /// JSON is a programming error and is recorded as `null`.
    pub fn with<T: Serialize>(mut self, key: DocumentKey, default: &T) -> Self {
        let value = serde_json::to_value(default).unwrap_or(Value::Null);
        self.entries.insert(key, value);
        self
    }

    /// Persisted form of the default for `key`.
    pub fn raw(&self, key: &DocumentKey) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Typed default for `key`; `None` if unregistered or of a different shape.
    pub fn get<T: DeserializeOwned>(&self, key: &DocumentKey) -> Option<T> {
        self.raw(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }
}
