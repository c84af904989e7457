// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Load/save policy of `SettingsController` against a recording store.
#![allow(missing_docs, clippy::unwrap_used)]

mod common;

use common::{Op, RecordingStore};
use gamepad_settings_core::{
    DocumentKey, DocumentState, Origin, ReportKind, SettingsController, SettingsReport,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Sensitivity {
    sensitivity: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
struct Bindings {
    buttons: BTreeMap<String, String>,
    axes: BTreeMap<String, String>,
}

fn key(name: &str) -> DocumentKey {
    DocumentKey::new(name).unwrap()
}

fn controller(store: &Arc<RecordingStore>) -> SettingsController {
    SettingsController::new(store.clone())
}

fn drain(rx: &mut tokio::sync::mpsc::UnboundedReceiver<SettingsReport>) -> Vec<SettingsReport> {
    let mut out = Vec::new();
    while let Ok(report) = rx.try_recv() {
        out.push(report);
    }
    out
}

#[tokio::test]
async fn absent_entry_loads_default_without_writing() {
    let store = Arc::new(RecordingStore::new());
    let mut ctl = controller(&store);
    let doc = ctl
        .load(key("gamepad-prefs"), Sensitivity { sensitivity: 3 })
        .await;
    ctl.flush().await;

    assert_eq!(doc.current_value(), &Sensitivity { sensitivity: 3 });
    assert_eq!(doc.state(), DocumentState::Loaded);
    assert_eq!(store.ops(), vec![Op::Get(String::from("gamepad-prefs"))]);
}

#[tokio::test]
async fn stored_entry_is_loaded_and_not_written_back() {
    let store = Arc::new(RecordingStore::seeded(
        "gamepad-prefs",
        json!({"sensitivity": 5}),
    ));
    let mut ctl = controller(&store);
    let doc = ctl
        .load(key("gamepad-prefs"), Sensitivity { sensitivity: 3 })
        .await;
    ctl.flush().await;

    assert_eq!(doc.current_value(), &Sensitivity { sensitivity: 5 });
    assert!(store.writes().is_empty());
}

#[tokio::test]
async fn reapplying_a_load_never_persists() {
    let store = Arc::new(RecordingStore::new());
    let mut ctl = controller(&store);
    let mut doc = ctl
        .load(key("gamepad-prefs"), Sensitivity { sensitivity: 3 })
        .await;
    doc.replace_all(Sensitivity { sensitivity: 9 }, Origin::Load);
    ctl.flush().await;

    assert_eq!(doc.current_value().sensitivity, 9);
    assert!(store.writes().is_empty());
}

#[tokio::test]
async fn non_default_edit_is_set_exactly_once() {
    let store = Arc::new(RecordingStore::new());
    let mut ctl = controller(&store);
    let mut doc = ctl
        .load(key("gamepad-prefs"), Sensitivity { sensitivity: 3 })
        .await;
    doc.replace_all(Sensitivity { sensitivity: 7 }, Origin::Edit);
    ctl.flush().await;

    assert_eq!(
        store.writes(),
        vec![Op::Set(
            String::from("gamepad-prefs"),
            json!({"sensitivity": 7})
        )]
    );
    assert_eq!(
        store.stored("gamepad-prefs").await,
        Some(json!({"sensitivity": 7}))
    );
}

#[tokio::test]
async fn edit_back_to_default_removes_stored_prefs() {
    let store = Arc::new(RecordingStore::seeded(
        "gamepad-prefs",
        json!({"sensitivity": 5}),
    ));
    let mut ctl = controller(&store);
    let mut doc = ctl
        .load(key("gamepad-prefs"), Sensitivity { sensitivity: 3 })
        .await;
    assert_eq!(doc.current_value(), &Sensitivity { sensitivity: 5 });

    doc.edit(|prefs| prefs.sensitivity = 3);
    ctl.flush().await;

    assert_eq!(
        store.writes(),
        vec![Op::Remove(String::from("gamepad-prefs"))]
    );
    assert_eq!(store.stored("gamepad-prefs").await, None);
}

#[tokio::test]
async fn adding_a_button_binding_stores_the_whole_document() {
    let store = Arc::new(RecordingStore::new());
    let mut ctl = controller(&store);
    let mut doc = ctl.load(key("gamepad-bindings"), Bindings::default()).await;
    assert_eq!(doc.current_value(), &Bindings::default());

    doc.edit(|b| {
        b.buttons.insert(String::from("A"), String::from("Space"));
    });
    ctl.flush().await;

    assert_eq!(
        store.writes(),
        vec![Op::Set(
            String::from("gamepad-bindings"),
            json!({"buttons": {"A": "Space"}, "axes": {}})
        )]
    );
}

#[tokio::test]
async fn default_check_is_structural_not_by_identity() {
    let store = Arc::new(RecordingStore::new());
    let mut ctl = controller(&store);
    let mut default = HashMap::new();
    for control in ["0", "1", "2", "3", "4", "5", "6", "7"] {
        default.insert(control.to_owned(), vec![format!("action-{control}"), String::from("fast")]);
    }
    let mut doc = ctl.load(key("gamepad-bindings"), default.clone()).await;

    doc.edit(|map| {
        map.remove("3");
    });
    // Rebuilt from scratch in a different insertion order.
    let mut rebuilt = HashMap::new();
    for control in ["7", "6", "5", "4", "3", "2", "1", "0"] {
        rebuilt.insert(control.to_owned(), vec![format!("action-{control}"), String::from("fast")]);
    }
    doc.replace_all(rebuilt, Origin::Edit);
    // Same entries, but the sequence order differs: not a default.
    doc.edit(|map| {
        if let Some(list) = map.get_mut("0") {
            list.reverse();
        }
    });
    ctl.flush().await;

    let writes = store.writes();
    assert_eq!(writes.len(), 3);
    assert!(matches!(&writes[0], Op::Set(k, _) if k == "gamepad-bindings"));
    assert_eq!(writes[1], Op::Remove(String::from("gamepad-bindings")));
    assert!(matches!(&writes[2], Op::Set(_, v) if v["0"] == json!(["fast", "action-0"])));
}

#[tokio::test]
async fn writes_reach_the_store_in_edit_order() {
    let store = Arc::new(RecordingStore::new());
    let mut ctl = controller(&store);
    let mut doc = ctl
        .load(key("gamepad-prefs"), Sensitivity { sensitivity: 3 })
        .await;
    for s in [4, 5, 3, 6] {
        doc.replace_all(Sensitivity { sensitivity: s }, Origin::Edit);
    }
    ctl.flush().await;

    assert_eq!(
        store.writes(),
        vec![
            Op::Set(String::from("gamepad-prefs"), json!({"sensitivity": 4})),
            Op::Set(String::from("gamepad-prefs"), json!({"sensitivity": 5})),
            Op::Remove(String::from("gamepad-prefs")),
            Op::Set(String::from("gamepad-prefs"), json!({"sensitivity": 6})),
        ]
    );
    assert_eq!(
        store.stored("gamepad-prefs").await,
        Some(json!({"sensitivity": 6}))
    );
}

#[tokio::test]
async fn read_failure_falls_back_for_that_document_only() {
    let store = Arc::new(RecordingStore::seeded(
        "gamepad-bindings",
        json!({"buttons": {"B": "Escape"}, "axes": {}}),
    ));
    store.fail_reads_for("gamepad-prefs");
    let mut ctl = controller(&store);
    let mut reports = ctl.reports().unwrap();

    let prefs = ctl
        .load(key("gamepad-prefs"), Sensitivity { sensitivity: 3 })
        .await;
    let bindings = ctl.load(key("gamepad-bindings"), Bindings::default()).await;

    assert_eq!(prefs.current_value().sensitivity, 3);
    assert_eq!(bindings.current_value().buttons["B"], "Escape");
    let reports = drain(&mut reports);
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].key, key("gamepad-prefs"));
    assert_eq!(reports[0].kind, ReportKind::ReadFailed);
}

#[tokio::test]
async fn undecodable_value_is_treated_as_absent() {
    let store = Arc::new(RecordingStore::seeded(
        "gamepad-prefs",
        json!({"sensitivity": "very"}),
    ));
    let mut ctl = controller(&store);
    let mut reports = ctl.reports().unwrap();
    let doc = ctl
        .load(key("gamepad-prefs"), Sensitivity { sensitivity: 3 })
        .await;
    ctl.flush().await;

    assert_eq!(doc.current_value().sensitivity, 3);
    assert!(store.writes().is_empty());
    let reports = drain(&mut reports);
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].kind, ReportKind::Malformed);
}

#[tokio::test]
async fn corrupt_entry_is_treated_as_absent() {
    let store = Arc::new(RecordingStore::new());
    store.corrupt("gamepad-bindings");
    let mut ctl = controller(&store);
    let mut reports = ctl.reports().unwrap();
    let doc = ctl.load(key("gamepad-bindings"), Bindings::default()).await;

    assert_eq!(doc.current_value(), &Bindings::default());
    assert_eq!(drain(&mut reports)[0].kind, ReportKind::Malformed);
}

#[tokio::test]
async fn write_failure_keeps_the_edit_and_reports_it() {
    let store = Arc::new(RecordingStore::new());
    let mut ctl = controller(&store);
    let mut reports = ctl.reports().unwrap();
    let mut doc = ctl
        .load(key("gamepad-prefs"), Sensitivity { sensitivity: 3 })
        .await;

    store.fail_writes(true);
    doc.replace_all(Sensitivity { sensitivity: 8 }, Origin::Edit);
    ctl.flush().await;

    assert_eq!(doc.current_value().sensitivity, 8);
    assert_eq!(store.stored("gamepad-prefs").await, None);
    let failed = drain(&mut reports);
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].kind, ReportKind::WriteFailed);
    assert!(failed[0].detail.contains("quota exceeded"));

    // Next edit retries naturally once the backend recovers.
    store.fail_writes(false);
    doc.replace_all(Sensitivity { sensitivity: 9 }, Origin::Edit);
    ctl.flush().await;
    assert_eq!(
        store.stored("gamepad-prefs").await,
        Some(json!({"sensitivity": 9}))
    );
    assert!(drain(&mut reports).is_empty());
}

#[tokio::test]
async fn start_loads_every_entry_and_attaches_in_order() {
    let store = Arc::new(RecordingStore::seeded("profile-b", json!({"sensitivity": 1})));
    let mut ctl = controller(&store);
    let docs = ctl
        .start(vec![
            (key("profile-a"), Sensitivity { sensitivity: 3 }),
            (key("profile-b"), Sensitivity { sensitivity: 3 }),
        ])
        .await;

    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0].key(), &key("profile-a"));
    assert_eq!(docs[0].current_value().sensitivity, 3);
    assert_eq!(docs[1].current_value().sensitivity, 1);
    assert_eq!(
        ctl.attached().cloned().collect::<Vec<_>>(),
        vec![key("profile-a"), key("profile-b")]
    );
    assert!(store.writes().is_empty());
}

#[tokio::test]
async fn edits_after_shutdown_are_reported() {
    let store = Arc::new(RecordingStore::new());
    let mut ctl = controller(&store);
    let mut reports = ctl.reports().unwrap();
    let mut doc = ctl
        .load(key("gamepad-prefs"), Sensitivity { sensitivity: 3 })
        .await;
    doc.replace_all(Sensitivity { sensitivity: 4 }, Origin::Edit);
    ctl.shutdown().await;

    assert_eq!(store.writes().len(), 1);
    doc.replace_all(Sensitivity { sensitivity: 5 }, Origin::Edit);
    assert_eq!(drain(&mut reports)[0].kind, ReportKind::WriteFailed);
    assert_eq!(store.writes().len(), 1);
}
