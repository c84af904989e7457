// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Settings core for the gamepad navigator settings panel.
//!
//! Two independent documents (preferences and bindings) are loaded from an
//! async key-value store, bound two-way to sub-panels, and persisted on every
//! user edit. A document that is edited back to its default is removed from
//! storage instead of written. UI and storage adapters stay thin and live
//! outside this crate.

pub mod controller;
pub mod defaults;
pub mod document;
pub mod equality;
pub mod key;
pub mod notice;
pub mod panel;
pub mod schema;
pub mod session;
pub mod store;

pub use controller::{LoadSource, ReportKind, SettingsController, SettingsReport};
pub use defaults::DefaultsRegistry;
pub use document::{DocumentState, Origin, SettingsDocument};
pub use equality::is_deeply_equal;
pub use key::{DocumentKey, KeyError};
pub use session::{SessionOptions, SettingsSession};
pub use store::{MemoryStore, SettingsStore, StoreError};
