// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Document identifiers (also used verbatim as storage keys).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Storage key of the preferences document.
pub const PREFS_KEY: &str = "gamepad-prefs";
/// Storage key of the button/axis bindings document.
pub const BINDINGS_KEY: &str = "gamepad-bindings";

/// Immutable name of a settings document.
///
/// Keys double as filenames in filesystem-backed stores, so the accepted
/// alphabet is deliberately narrow: ASCII lowercase, digits, `-`, `_`, `.`,
/// and no leading `.`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentKey(String);

/// Rejected document key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// Key was empty.
    #[error("document key is empty")]
    Empty,
    /// Key starts with `.`.
    #[error("document key {0:?} must not start with '.'")]
    LeadingDot(String),
    /// Key contains a character outside the accepted alphabet.
    #[error("document key {key:?} contains invalid character {ch:?}")]
    InvalidChar {
        /// Offending key.
        key: String,
        /// First rejected character.
        ch: char,
    },
}

impl DocumentKey {
    /// Validate and wrap a key.
    pub fn new(key: impl Into<String>) -> Result<Self, KeyError> {
        let key = key.into();
        if key.is_empty() {
            return Err(KeyError::Empty);
        }
        if key.starts_with('.') {
            return Err(KeyError::LeadingDot(key));
        }
        if let Some(ch) = key
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_' | '.')))
        {
            return Err(KeyError::InvalidChar { key, ch });
        }
        Ok(Self(key))
    }

    /// Key of the preferences document.
    pub fn prefs() -> Self {
        Self(PREFS_KEY.to_owned())
    }

    /// Key of the bindings document.
    pub fn bindings() -> Self {
        Self(BINDINGS_KEY.to_owned())
    }

    /// Borrow the key text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DocumentKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for DocumentKey {
    type Error = KeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DocumentKey> for String {
    fn from(key: DocumentKey) -> Self {
        key.0
    }
}

impl AsRef<str> for DocumentKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
