//! Persistence of the last visited directory.

use std::path::{Path, PathBuf};

use qsfm_protocol::RemotePath;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StateError;

#[derive(Debug, Serialize, Deserialize)]
struct StateFile {
    cwd: RemotePath,
}

/// JSON file holding `{"cwd": "<path>"}`.
#[derive(Debug, Clone)]
pub struct LastDirStore {
    path: PathBuf,
}

impl LastDirStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored directory. A missing file is `Ok(None)`.
    pub fn load(&self) -> Result<Option<RemotePath>, StateError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let data = std::fs::read_to_string(&self.path)?;
        let state: StateFile = serde_json::from_str(&data)?;
        debug!(cwd = %state.cwd, file = ?self.path, "loaded last directory");
        Ok(Some(state.cwd))
    }

    pub fn save(&self, cwd: &RemotePath) -> Result<(), StateError> {
        let json = serde_json::to_string_pretty(&StateFile { cwd: cwd.clone() })?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

/// Default state file: `<config dir>/qsfm/state.json`.
pub fn default_state_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("qsfm").join("state.json"))
}

/// Returns the platform-specific config directory.
pub fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "linux")]
    {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var("HOME")
                    .ok()
                    .map(|h| PathBuf::from(h).join(".config"))
            })
    }

    #[cfg(target_os = "windows")]
    {
        std::env::var("APPDATA").ok().map(PathBuf::from)
    }

    #[cfg(not(any(target_os = "linux", target_os = "windows")))]
    {
        std::env::var("HOME")
            .ok()
            .map(|h| PathBuf::from(h).join(".config"))
    }
}
