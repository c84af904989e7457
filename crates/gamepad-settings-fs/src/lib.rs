// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Filesystem-backed `SettingsStore` (uses the platform config dir).

use async_trait::async_trait;
use directories::ProjectDirs;
use gamepad_settings_core::{DocumentKey, SettingsStore, StoreError};
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Store each document as `<key>.json` under a base directory.
#[derive(Debug, Clone)]
pub struct FsSettingsStore {
    base: PathBuf,
}

impl FsSettingsStore {
    /// Create a store rooted at the user config directory
    /// (e.g. `~/.config/gamepadnavigator`).
    pub fn new() -> Result<Self, StoreError> {
        let proj = ProjectDirs::from("org", "fluidproject", "GamepadNavigator")
            .ok_or_else(|| StoreError::Unavailable("could not resolve config dir".into()))?;
        Ok(Self::with_base_dir(proj.config_dir()))
    }

    /// Create a store rooted at `base`. The directory is created on first
    /// write.
    pub fn with_base_dir(base: impl AsRef<Path>) -> Self {
        Self {
            base: base.as_ref().to_path_buf(),
        }
    }

    /// Directory holding the documents.
    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    /// File backing `key`.
    pub fn path_for(&self, key: &DocumentKey) -> PathBuf {
        self.base.join(format!("{key}.json"))
    }

    fn staging_path_for(&self, key: &DocumentKey) -> PathBuf {
        self.base.join(format!(".{key}.json.tmp"))
    }
}

#[async_trait]
impl SettingsStore for FsSettingsStore {
    async fn get(&self, key: &DocumentKey) -> Result<Option<Value>, StoreError> {
        let bytes = match fs::read(self.path_for(key)).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(StoreError::Io(err)),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|err| StoreError::Corrupt {
                key: key.clone(),
                reason: err.to_string(),
            })
    }

    async fn set(&self, key: &DocumentKey, value: &Value) -> Result<(), StoreError> {
        let data = serde_json::to_vec_pretty(value)?;
        fs::create_dir_all(&self.base).await?;
        // Stage then rename so a crash never leaves a half-written document.
        let staging = self.staging_path_for(key);
        fs::write(&staging, &data).await?;
        fs::rename(&staging, self.path_for(key)).await?;
        debug!(%key, bytes = data.len(), "wrote settings file");
        Ok(())
    }

    async fn remove(&self, key: &DocumentKey) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(key)).await {
            Ok(()) => {
                debug!(%key, "removed settings file");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StoreError::Io(err)),
        }
    }
}
