// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Observable, named settings value.
//!
//! Every mutation carries an [`Origin`]. Change listeners only hear about
//! [`Origin::Edit`]; a value applied by [`Origin::Load`] is the stored state
//! already and must not be persisted again.

use crate::key::DocumentKey;
use std::fmt;

/// Who caused a replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Applied from storage (or defaults) while opening the session.
    Load,
    /// Made by the user through a panel.
    Edit,
}

/// Lifecycle of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentState {
    /// Holds the compiled-in default; nothing applied yet.
    Uninitialized,
    /// Holds the value applied by the last load.
    Loaded,
    /// Edited by the user this many times since the last load.
    Mutated(u64),
}

type Listener<T> = Box<dyn FnMut(&T) + Send>;

/// Named settings value with change listeners.
pub struct SettingsDocument<T> {
    key: DocumentKey,
    value: T,
    state: DocumentState,
    listeners: Vec<Listener<T>>,
}

impl<T> SettingsDocument<T> {
    /// Create a document holding `initial` (normally the default).
    pub fn new(key: DocumentKey, initial: T) -> Self {
        Self {
            key,
            value: initial,
            state: DocumentState::Uninitialized,
            listeners: Vec::new(),
        }
    }

    /// Document identity.
    pub fn key(&self) -> &DocumentKey {
        &self.key
    }

    /// Current value.
    pub fn current_value(&self) -> &T {
        &self.value
    }

    /// Lifecycle state.
    pub fn state(&self) -> DocumentState {
        self.state
    }

    /// Register a listener for user edits. Listeners run synchronously, in
    /// registration order, after the new value is in place.
    pub fn on_change<F>(&mut self, listener: F)
    where
        F: FnMut(&T) + Send + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Number of registered change listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Announce the current value as a user edit even though it did not
    /// change, so listeners persist it again.
    pub fn touch(&mut self) {
        self.notify();
    }

    fn notify(&mut self) {
        self.state = match self.state {
            DocumentState::Mutated(n) => DocumentState::Mutated(n + 1),
            DocumentState::Uninitialized | DocumentState::Loaded => DocumentState::Mutated(1),
        };
        for listener in &mut self.listeners {
            listener(&self.value);
        }
    }
}

impl<T: PartialEq> SettingsDocument<T> {
    /// Replace the whole value.
    ///
    /// `Origin::Load` resets the state to [`DocumentState::Loaded`] and stays
    /// silent. `Origin::Edit` notifies listeners when the value differs from
    /// the current one.
    pub fn replace_all(&mut self, value: T, origin: Origin) {
        match origin {
            Origin::Load => {
                self.value = value;
                self.state = DocumentState::Loaded;
            }
            Origin::Edit => {
                if self.value == value {
                    return;
                }
                self.value = value;
                self.notify();
            }
        }
    }
}

impl<T: PartialEq + Clone> SettingsDocument<T> {
    /// Mutate the value in place as a user edit.
    ///
    /// Listeners fire once, after `f` returns, and only if it changed the
    /// value. Returns whether it did.
    pub fn edit<F>(&mut self, f: F) -> bool
    where
        F: FnOnce(&mut T),
    {
        let before = self.value.clone();
        f(&mut self.value);
        if self.value == before {
            return false;
        }
        self.notify();
        true
    }
}

impl<T: fmt::Debug> fmt::Debug for SettingsDocument<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsDocument")
            .field("key", &self.key)
            .field("value", &self.value)
            .field("state", &self.state)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
