// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Bounded notice queue the settings UI renders for load/save problems.

use crate::controller::{ReportKind, SettingsReport};
use crate::key::DocumentKey;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Notice severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Informational note.
    Info,
    /// Something was ignored; settings still work.
    Warn,
    /// A document could not be read or saved.
    Error,
}

/// Identifier for a notice entry.
pub type NoticeId = u64;

/// Entry held by the board.
#[derive(Debug, Clone)]
pub struct Notice {
    /// Stable identifier.
    pub id: NoticeId,
    /// Severity.
    pub severity: Severity,
    /// Document the notice is about, if any.
    pub document: Option<DocumentKey>,
    /// Short title line.
    pub title: String,
    /// Optional detail text.
    pub detail: Option<String>,
    /// Time-to-live.
    pub ttl: Duration,
    /// Creation (or last refresh) time.
    pub created: Instant,
}

/// Render-ready view of a notice.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleNotice {
    /// Stable identifier.
    pub id: NoticeId,
    /// Severity.
    pub severity: Severity,
    /// Document the notice is about, if any.
    pub document: Option<DocumentKey>,
    /// Short title line.
    pub title: String,
    /// Optional detail text.
    pub detail: Option<String>,
    /// 1.0 -> just posted, 0.0 -> expired.
    pub remaining: f32,
}

/// In-memory notice queue with TTL and a dedupe window.
#[derive(Debug)]
pub struct NoticeBoard {
    queue: VecDeque<Notice>,
    capacity: usize,
    dedupe_window: Duration,
    next_id: NoticeId,
}

impl NoticeBoard {
    /// Board holding at most `capacity` notices; the oldest is evicted first.
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            capacity: capacity.max(1),
            dedupe_window: Duration::from_millis(500),
            next_id: 1,
        }
    }

    /// Post a notice. An identical one posted within the dedupe window is
    /// refreshed instead of duplicated.
    pub fn post(
        &mut self,
        severity: Severity,
        document: Option<DocumentKey>,
        title: impl Into<String>,
        detail: Option<String>,
        ttl: Duration,
        now: Instant,
    ) -> NoticeId {
        let title = title.into();
        if let Some(existing) = self.queue.iter_mut().find(|n| {
            n.severity == severity
                && n.document == document
                && n.title == title
                && n.detail == detail
                && now.saturating_duration_since(n.created) <= self.dedupe_window
        }) {
            existing.created = now;
            existing.ttl = ttl;
            return existing.id;
        }

        let id = self.next_id;
        self.next_id += 1;
        if self.queue.len() == self.capacity {
            self.queue.pop_front();
        }
        self.queue.push_back(Notice {
            id,
            severity,
            document,
            title,
            detail,
            ttl,
            created: now,
        });
        id
    }

    /// Post the notice for a controller report.
    pub fn post_report(&mut self, report: SettingsReport, ttl: Duration, now: Instant) -> NoticeId {
        let (severity, title) = match report.kind {
            ReportKind::ReadFailed => (Severity::Error, "Could not load settings; using defaults"),
            ReportKind::Malformed => (Severity::Warn, "Stored settings were unreadable; using defaults"),
            ReportKind::WriteFailed => (Severity::Error, "Could not save settings"),
        };
        self.post(severity, Some(report.key), title, Some(report.detail), ttl, now)
    }

    /// Drop expired notices.
    pub fn retain_visible(&mut self, now: Instant) {
        self.queue
            .retain(|n| now.saturating_duration_since(n.created) < n.ttl);
    }

    /// Live notices with their remaining-lifetime ratio.
    pub fn visible(&self, now: Instant) -> Vec<VisibleNotice> {
        self.queue
            .iter()
            .filter(|n| now.saturating_duration_since(n.created) < n.ttl)
            .map(|n| VisibleNotice {
                id: n.id,
                severity: n.severity,
                document: n.document.clone(),
                title: n.title.clone(),
                detail: n.detail.clone(),
                remaining: 1.0
                    - (now.saturating_duration_since(n.created).as_secs_f32() / n.ttl.as_secs_f32()),
            })
            .collect()
    }

    /// Number of held notices, expired or not.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the board holds nothing.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
