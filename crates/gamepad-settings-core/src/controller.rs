// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Loads settings documents from a [`SettingsStore`] and persists user edits.
//!
//! Each attached document gets one writer task fed by an unbounded queue, so
//! writes for a key reach the store in edit order while the UI never waits on
//! storage. A value that deep-equals the document default is removed from
//! the store rather than written.

use crate::document::{Origin, SettingsDocument};
use crate::equality::is_deeply_equal;
use crate::key::DocumentKey;
use crate::store::{SettingsStore, StoreError};
use futures_util::future::join_all;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// What went wrong with one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// Store read failed; the default was used.
    ReadFailed,
    /// Stored value could not be decoded; the default was used.
    Malformed,
    /// Store write/remove failed; the in-memory value was kept.
    WriteFailed,
}

/// Failure surfaced to the host UI. Always scoped to a single document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsReport {
    /// Affected document.
    pub key: DocumentKey,
    /// Failure class.
    pub kind: ReportKind,
    /// Underlying error text.
    pub detail: String,
}

impl fmt::Display for SettingsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self.kind {
            ReportKind::ReadFailed => "could not read",
            ReportKind::Malformed => "ignored malformed stored",
            ReportKind::WriteFailed => "could not save",
        };
        write!(f, "{what} {}: {}", self.key, self.detail)
    }
}

/// Where a fetched value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// Decoded from the stored entry.
    Stored,
    /// Nothing stored; the default was used.
    Absent,
    /// The store could not supply a usable value; the default was used and
    /// the problem reported.
    Fallback(ReportKind),
}

impl LoadSource {
    /// The default is showing in place of whatever the store holds.
    pub const fn fell_back(self) -> bool {
        matches!(self, Self::Fallback(_))
    }

    /// The store could not be read at all, so its contents are unknown.
    pub const fn read_failed(self) -> bool {
        matches!(self, Self::Fallback(ReportKind::ReadFailed))
    }
}

/// Store operation chosen by the save policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Value differed from the default and was written.
    Stored,
    /// Value equalled the default and the entry was removed.
    Removed,
}

/// Persist `value` under `key`, or remove the entry when it deep-equals
/// `default`. A `None` default never matches.
pub async fn save_document(
    store: &dyn SettingsStore,
    key: &DocumentKey,
    default: Option<&Value>,
    value: &Value,
) -> Result<SaveOutcome, StoreError> {
    if default.is_some_and(|default| is_deeply_equal(default, value)) {
        store.remove(key).await?;
        Ok(SaveOutcome::Removed)
    } else {
        store.set(key, value).await?;
        Ok(SaveOutcome::Stored)
    }
}

enum WriteCommand {
    Persist(Value),
    Flush(oneshot::Sender<()>),
}

struct Writer {
    key: DocumentKey,
    tx: mpsc::UnboundedSender<WriteCommand>,
    task: JoinHandle<()>,
}

/// Orchestrates load and save for any number of independent documents.
pub struct SettingsController {
    store: Arc<dyn SettingsStore>,
    reports_tx: mpsc::UnboundedSender<SettingsReport>,
    reports_rx: Option<mpsc::UnboundedReceiver<SettingsReport>>,
    writers: Vec<Writer>,
}

impl SettingsController {
    /// Create a controller over `store`.
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        let (reports_tx, reports_rx) = mpsc::unbounded_channel();
        Self {
            store,
            reports_tx,
            reports_rx: Some(reports_rx),
            writers: Vec::new(),
        }
    }

    /// Take the receiving end of the report stream. Only the first call
    /// returns `Some`.
    pub fn reports(&mut self) -> Option<mpsc::UnboundedReceiver<SettingsReport>> {
        self.reports_rx.take()
    }

    /// Keys of every attached document, in attach order.
    pub fn attached(&self) -> impl Iterator<Item = &DocumentKey> {
        self.writers.iter().map(|w| &w.key)
    }

    fn report(&self, key: &DocumentKey, kind: ReportKind, detail: String) {
        emit(&self.reports_tx, key, kind, detail);
    }

    /// Read the stored value for `key`, falling back to `default` when it is
    /// absent, unreadable or does not decode into `T`. Never fails; problems
    /// are reported.
    pub async fn fetch<T>(&self, key: &DocumentKey, default: &T) -> T
    where
        T: DeserializeOwned + Clone,
    {
        self.fetch_with_source(key, default).await.0
    }

    /// [`fetch`](Self::fetch), also telling where the value came from.
    pub async fn fetch_with_source<T>(&self, key: &DocumentKey, default: &T) -> (T, LoadSource)
    where
        T: DeserializeOwned + Clone,
    {
        let (kind, detail) = match self.store.get(key).await {
            Ok(Some(raw)) => match serde_json::from_value::<T>(raw) {
                Ok(value) => {
                    info!(%key, "loaded stored settings");
                    return (value, LoadSource::Stored);
                }
                Err(err) => (ReportKind::Malformed, err.to_string()),
            },
            Ok(None) => {
                info!(%key, "no stored settings; using defaults");
                return (default.clone(), LoadSource::Absent);
            }
            Err(StoreError::Corrupt { reason, .. }) => (ReportKind::Malformed, reason),
            Err(err) => (ReportKind::ReadFailed, err.to_string()),
        };
        self.report(key, kind, detail);
        (default.clone(), LoadSource::Fallback(kind))
    }

    /// Build the document for `key`, apply `value` as a load, then start
    /// persisting user edits.
    ///
    /// The save listener is registered only after the load is applied, so
    /// the loaded value is never written back. Must be called from within a
    /// Tokio runtime.
    pub fn attach<T>(&mut self, key: DocumentKey, default: T, value: T) -> SettingsDocument<T>
    where
        T: Serialize + PartialEq + Send + 'static,
    {
        let default_raw = match serde_json::to_value(&default) {
            Ok(raw) => Some(raw),
            Err(err) => {
                warn!(%key, ?err, "default is not representable; every edit will be stored");
                None
            }
        };

        let mut document = SettingsDocument::new(key.clone(), default);
        document.replace_all(value, Origin::Load);

        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_writer(
            self.store.clone(),
            key.clone(),
            default_raw,
            rx,
            self.reports_tx.clone(),
        ));

        let queue = tx.clone();
        let reports = self.reports_tx.clone();
        let listener_key = key.clone();
        document.on_change(move |value: &T| match serde_json::to_value(value) {
            Ok(raw) => {
                if queue.send(WriteCommand::Persist(raw)).is_err() {
                    emit(
                        &reports,
                        &listener_key,
                        ReportKind::WriteFailed,
                        String::from("settings writer has shut down"),
                    );
                }
            }
            Err(err) => emit(&reports, &listener_key, ReportKind::WriteFailed, err.to_string()),
        });

        self.writers.push(Writer { key, tx, task });
        document
    }

    /// [`fetch`](Self::fetch) followed by [`attach`](Self::attach).
    pub async fn load<T>(&mut self, key: DocumentKey, default: T) -> SettingsDocument<T>
    where
        T: Serialize + DeserializeOwned + PartialEq + Clone + Send + 'static,
    {
        let value = self.fetch(&key, &default).await;
        self.attach(key, default, value)
    }

    /// Load every `(key, default)` entry. Reads run concurrently; documents
    /// are attached once all reads have settled, in entry order.
    pub async fn start<T>(&mut self, entries: Vec<(DocumentKey, T)>) -> Vec<SettingsDocument<T>>
    where
        T: Serialize + DeserializeOwned + PartialEq + Clone + Send + 'static,
    {
        let values = join_all(
            entries
                .iter()
                .map(|(key, default)| self.fetch(key, default)),
        )
        .await;
        entries
            .into_iter()
            .zip(values)
            .map(|((key, default), value)| self.attach(key, default, value))
            .collect()
    }

    /// Wait until every write queued before this call has reached the store.
    pub async fn flush(&self) {
        let mut pending = Vec::with_capacity(self.writers.len());
        for writer in &self.writers {
            let (done_tx, done_rx) = oneshot::channel();
            if writer.tx.send(WriteCommand::Flush(done_tx)).is_ok() {
                pending.push(done_rx);
            }
        }
        for done in pending {
            let _ = done.await;
        }
    }

    /// Drain pending writes and stop every writer task. Edits made to
    /// documents afterwards are reported as write failures.
    pub async fn shutdown(mut self) {
        self.flush().await;
        for writer in self.writers.drain(..) {
            writer.task.abort();
            let _ = writer.task.await;
            debug!(key = %writer.key, "settings writer stopped");
        }
    }
}

fn emit(
    reports: &mpsc::UnboundedSender<SettingsReport>,
    key: &DocumentKey,
    kind: ReportKind,
    detail: String,
) {
    let report = SettingsReport {
        key: key.clone(),
        kind,
        detail,
    };
    warn!(%report, "settings problem");
    // Receiver may be gone when nobody displays reports; the log line stands.
    let _ = reports.send(report);
}

async fn run_writer(
    store: Arc<dyn SettingsStore>,
    key: DocumentKey,
    default: Option<Value>,
    mut rx: mpsc::UnboundedReceiver<WriteCommand>,
    reports: mpsc::UnboundedSender<SettingsReport>,
) {
    while let Some(command) = rx.recv().await {
        match command {
            WriteCommand::Persist(value) => {
                match save_document(store.as_ref(), &key, default.as_ref(), &value).await {
                    Ok(outcome) => debug!(%key, ?outcome, "settings persisted"),
                    Err(err) => emit(&reports, &key, ReportKind::WriteFailed, err.to_string()),
                }
            }
            WriteCommand::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
}
