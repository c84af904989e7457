// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The open settings panel: both gamepad documents, their sub-panels, and the
//! notices raised while loading and saving them.

use crate::controller::{LoadSource, SettingsController, SettingsReport};
use crate::defaults::DefaultsRegistry;
use crate::document::{DocumentState, SettingsDocument};
use crate::key::DocumentKey;
use crate::notice::{NoticeBoard, VisibleNotice};
use crate::panel::{axes_panel, buttons_panel, prefs_panel, SubPanel};
use crate::schema::{BindingMap, GamepadBindings, GamepadPrefs};
use crate::store::SettingsStore;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Tunables for a settings session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Defaults for the prefs and bindings documents.
    pub defaults: DefaultsRegistry,
    /// Maximum notices kept on the board.
    pub notice_capacity: usize,
    /// How long a notice stays visible.
    pub notice_ttl: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            defaults: DefaultsRegistry::gamepad(),
            notice_capacity: 16,
            notice_ttl: Duration::from_secs(6),
        }
    }
}

/// One open settings panel.
///
/// Only one session per store is assumed; nothing here guards against a
/// second writer on the same keys.
pub struct SettingsSession {
    /// Preferences document.
    pub prefs: SettingsDocument<GamepadPrefs>,
    /// Button/axis bindings document.
    pub bindings: SettingsDocument<GamepadBindings>,
    prefs_default: GamepadPrefs,
    bindings_default: GamepadBindings,
    prefs_source: LoadSource,
    bindings_source: LoadSource,
    controller: SettingsController,
    reports: Option<mpsc::UnboundedReceiver<SettingsReport>>,
    notices: NoticeBoard,
    notice_ttl: Duration,
}

impl SettingsSession {
    /// Open the settings panel: load both documents concurrently, apply them,
    /// then start persisting edits. Must run inside a Tokio runtime.
    pub async fn open(store: Arc<dyn SettingsStore>, options: SessionOptions) -> Self {
        let prefs_key = DocumentKey::prefs();
        let bindings_key = DocumentKey::bindings();
        let prefs_default: GamepadPrefs = typed_default(&options.defaults, &prefs_key);
        let bindings_default: GamepadBindings = typed_default(&options.defaults, &bindings_key);

        let mut controller = SettingsController::new(store);
        let reports = controller.reports();

        let ((prefs_value, prefs_source), (bindings_value, bindings_source)) = tokio::join!(
            controller.fetch_with_source(&prefs_key, &prefs_default),
            controller.fetch_with_source(&bindings_key, &bindings_default),
        );
        let prefs = controller.attach(prefs_key, prefs_default.clone(), prefs_value);
        let bindings = controller.attach(bindings_key, bindings_default.clone(), bindings_value);
        info!("settings session open");

        Self {
            prefs,
            bindings,
            prefs_default,
            bindings_default,
            prefs_source,
            bindings_source,
            controller,
            reports,
            notices: NoticeBoard::new(options.notice_capacity),
            notice_ttl: options.notice_ttl,
        }
    }

    /// Preferences panel.
    pub fn prefs_panel(&self) -> SubPanel<GamepadPrefs, GamepadPrefs> {
        prefs_panel()
    }

    /// Buttons / triggers panel.
    pub fn buttons_panel(&self) -> SubPanel<GamepadBindings, BindingMap> {
        buttons_panel()
    }

    /// Thumb stick panel.
    pub fn axes_panel(&self) -> SubPanel<GamepadBindings, BindingMap> {
        axes_panel()
    }

    /// Where the preferences shown on open came from.
    pub fn prefs_source(&self) -> LoadSource {
        self.prefs_source
    }

    /// Where the bindings shown on open came from.
    pub fn bindings_source(&self) -> LoadSource {
        self.bindings_source
    }

    /// Restore default preferences as a user edit (clears the stored entry).
    ///
    /// Returns whether a store update was queued.
    pub fn reset_prefs(&mut self) -> bool {
        let default = self.prefs_default.clone();
        reset(&mut self.prefs, default, self.prefs_source)
    }

    /// Restore default bindings as a user edit (clears the stored entry).
    ///
    /// Returns whether a store update was queued.
    pub fn reset_bindings(&mut self) -> bool {
        let default = self.bindings_default.clone();
        reset(&mut self.bindings, default, self.bindings_source)
    }

    /// Move pending reports onto the notice board and return what is visible.
    pub fn poll_notices(&mut self, now: Instant) -> Vec<VisibleNotice> {
        if let Some(reports) = self.reports.as_mut() {
            while let Ok(report) = reports.try_recv() {
                self.notices.post_report(report, self.notice_ttl, now);
            }
        }
        self.notices.retain_visible(now);
        self.notices.visible(now)
    }

    /// Wait until every edit made so far has been persisted (or reported).
    pub async fn flush(&self) {
        self.controller.flush().await;
    }

    /// Persist outstanding edits, stop the writers, and return any notices
    /// that were still pending.
    pub async fn close(mut self) -> Vec<VisibleNotice> {
        self.controller.flush().await;
        let notices = self.poll_notices(Instant::now());
        self.controller.shutdown().await;
        info!("settings session closed");
        notices
    }
}

fn typed_default<T>(defaults: &DefaultsRegistry, key: &DocumentKey) -> T
where
    T: DeserializeOwned + Default,
{
    defaults.get(key).unwrap_or_else(|| {
        warn!(%key, "no usable default registered; using the built-in one");
        T::default()
    })
}

fn reset<T>(document: &mut SettingsDocument<T>, default: T, source: LoadSource) -> bool
where
    T: PartialEq + Clone,
{
    if document.edit(|value| *value = default) {
        return true;
    }
    // Still showing the fallback for an unusable stored entry: that entry
    // has to go even though the value in memory is already the default.
    if source.fell_back() && document.state() == DocumentState::Loaded {
        document.touch();
        return true;
    }
    false
}
