// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! `gamepad-settings`: open the settings panel without a UI and inspect or
//! edit the stored gamepad preferences and bindings.

mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use gamepad_settings_core::{SessionOptions, SettingsSession};
use gamepad_settings_fs::FsSettingsStore;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect and edit gamepad navigator settings")]
struct Args {
    /// Directory holding the settings documents (defaults to the platform config dir)
    #[arg(long, env = "GAMEPAD_SETTINGS_DIR")]
    store_dir: Option<PathBuf>,
    /// Command to execute
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print both documents as JSON
    Show,
    /// Print one document as JSON
    Get {
        /// Document to print
        document: Document,
    },
    /// Set one preference (camelCase field name, JSON value)
    SetPref {
        /// Field name, e.g. `pollingFrequency`
        field: String,
        /// New value as JSON, e.g. `16` or `"https://example.org/"`
        value: String,
    },
    /// Map a control to an action
    Bind {
        /// Binding section
        section: Section,
        /// Control index
        control: String,
        /// Action identifier
        action: String,
        /// Speed multiplier
        #[arg(long)]
        speed: Option<f64>,
        /// Invert the axis direction
        #[arg(long)]
        invert: bool,
        /// Apply while the window is in the background
        #[arg(long)]
        background: bool,
    },
    /// Remove a control mapping
    Unbind {
        /// Binding section
        section: Section,
        /// Control index
        control: String,
    },
    /// Restore a document to its defaults (removes it from storage)
    Reset {
        /// Document to reset
        document: Document,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Document {
    Prefs,
    Bindings,
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Prefs => "prefs",
            Self::Bindings => "bindings",
        })
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Buttons,
    Axes,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let store = match args.store_dir {
        Some(dir) => FsSettingsStore::with_base_dir(dir),
        None => FsSettingsStore::new().context("resolve settings directory")?,
    };
    let session = SettingsSession::open(Arc::new(store), SessionOptions::default()).await;
    commands::run(session, args.cmd).await
}
