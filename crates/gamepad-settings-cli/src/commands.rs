// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Command handlers: every edit goes through a sub-panel so the session's
//! save policy decides between writing and removing.

use crate::{Command, Document, Section};
use anyhow::{anyhow, bail, Context, Result};
use gamepad_settings_core::notice::{Severity, VisibleNotice};
use gamepad_settings_core::panel::SubPanel;
use gamepad_settings_core::schema::{ActionBinding, BindingMap, GamepadBindings, GamepadPrefs};
use gamepad_settings_core::SettingsSession;
use serde_json::{json, Value};
use std::io::{self, Write};
use tracing::info;

pub async fn run(mut session: SettingsSession, cmd: Command) -> Result<()> {
    let outcome = match unreadable_target(&session, &cmd) {
        Some(document) => Err(anyhow!(
            "{document} could not be read; refusing to edit defaults over it \
             (`reset {document}` discards the stored copy)"
        )),
        None => apply(&mut session, cmd),
    };
    let notices = session.close().await;
    let reported = report(&notices);
    outcome.and(reported)
}

/// Document an editing command would overwrite although its stored copy was
/// never read. Writing "defaults plus one edit" there would lose that copy.
fn unreadable_target(session: &SettingsSession, cmd: &Command) -> Option<Document> {
    let document = match cmd {
        Command::SetPref { .. } => Document::Prefs,
        Command::Bind { .. } | Command::Unbind { .. } => Document::Bindings,
        Command::Show | Command::Get { .. } | Command::Reset { .. } => return None,
    };
    let source = match document {
        Document::Prefs => session.prefs_source(),
        Document::Bindings => session.bindings_source(),
    };
    source.read_failed().then_some(document)
}

fn apply(session: &mut SettingsSession, cmd: Command) -> Result<()> {
    match cmd {
        Command::Show => print_json(&json!({
            "prefs": session.prefs.current_value(),
            "bindings": session.bindings.current_value(),
        })),
        Command::Get { document } => match document {
            Document::Prefs => print_json(session.prefs.current_value()),
            Document::Bindings => print_json(session.bindings.current_value()),
        },
        Command::SetPref { field, value } => {
            let value: Value = serde_json::from_str(&value)
                .with_context(|| format!("parse {value:?} as JSON"))?;
            let prefs = with_pref(session.prefs.current_value(), &field, value)?;
            if !session.prefs_panel().replace(&mut session.prefs, prefs) {
                info!(%field, "preference already has that value");
            }
            Ok(())
        }
        Command::Bind {
            section,
            control,
            action,
            speed,
            invert,
            background,
        } => {
            let mut binding = ActionBinding::new(action);
            if let Some(speed) = speed {
                binding = binding.with_speed(speed);
            }
            if invert {
                binding = binding.with_invert(true);
            }
            if background {
                binding = binding.with_background(true);
            }
            panel_for(session, section).bind(&mut session.bindings, control, binding);
            Ok(())
        }
        Command::Unbind { section, control } => {
            if !panel_for(session, section).unbind(&mut session.bindings, &control) {
                info!(%control, "control was not bound");
            }
            Ok(())
        }
        Command::Reset { document } => {
            let changed = match document {
                Document::Prefs => session.reset_prefs(),
                Document::Bindings => session.reset_bindings(),
            };
            if !changed {
                info!(?document, "already at defaults");
            }
            Ok(())
        }
    }
}

fn panel_for(session: &SettingsSession, section: Section) -> SubPanel<GamepadBindings, BindingMap> {
    match section {
        Section::Buttons => session.buttons_panel(),
        Section::Axes => session.axes_panel(),
    }
}

/// Copy of `prefs` with one camelCase field replaced; the result must still
/// decode as a complete preferences record.
fn with_pref(prefs: &GamepadPrefs, field: &str, value: Value) -> Result<GamepadPrefs> {
    let mut raw = serde_json::to_value(prefs)?;
    let slot = raw
        .as_object_mut()
        .and_then(|fields| fields.get_mut(field))
        .ok_or_else(|| anyhow!("unknown preference {field:?}"))?;
    *slot = value;
    serde_json::from_value(raw).with_context(|| format!("invalid value for preference {field:?}"))
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    writeln!(io::stdout().lock(), "{text}")?;
    Ok(())
}

fn report(notices: &[VisibleNotice]) -> Result<()> {
    let mut err = io::stderr().lock();
    for notice in notices {
        let level = match notice.severity {
            Severity::Info => "info",
            Severity::Warn => "warning",
            Severity::Error => "error",
        };
        let document = notice
            .document
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();
        write!(err, "{level}: {} [{document}]", notice.title)?;
        if let Some(detail) = &notice.detail {
            write!(err, ": {detail}")?;
        }
        writeln!(err)?;
    }
    if notices.iter().any(|n| n.severity == Severity::Error) {
        bail!("settings were not fully loaded or saved");
    }
    Ok(())
}
