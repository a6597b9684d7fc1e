//! Client configuration management.
//!
//! Configuration is stored as TOML:
//! - Linux: `~/.config/qsfm/client.toml`
//! - Windows: `%APPDATA%/qsfm/client.toml`

use std::path::{Path, PathBuf};
use std::time::Duration;

use qsfm_explorer::{DEFAULT_ROOT, LastDirStore, config_dir, default_state_path};
use qsfm_transfer::{DEFAULT_CHUNK_SIZE, DEFAULT_MAX_FILES, UploadPolicy};
use serde::{Deserialize, Serialize};

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the file-manager server.
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Directory opened when no last directory is stored.
    #[serde(default = "default_root_path")]
    pub root_path: String,

    /// Upload chunk size in bytes.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Maximum number of files per upload batch.
    #[serde(default = "default_max_files")]
    pub max_files: usize,

    /// Accepted MIME types or `.ext` extensions. Empty accepts everything.
    #[serde(default)]
    pub allowed_types: Vec<String>,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Last-directory state file. Empty selects the default location.
    #[serde(default)]
    pub state_file: String,
}

fn default_server_url() -> String {
    "http://127.0.0.1:8686".into()
}

fn default_root_path() -> String {
    DEFAULT_ROOT.into()
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_max_files() -> usize {
    DEFAULT_MAX_FILES
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            root_path: default_root_path(),
            chunk_size: default_chunk_size(),
            max_files: default_max_files(),
            allowed_types: Vec::new(),
            request_timeout_secs: default_request_timeout_secs(),
            state_file: String::new(),
        }
    }
}

impl ClientConfig {
    /// Loads configuration from the default location, writing defaults
    /// there if the file does not exist yet.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&config_path()?)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: ClientConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            let config = ClientConfig::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }

    /// Applies `QSFM_SERVER_URL` from `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("QSFM_SERVER_URL").filter(|v| !v.is_empty()) {
            self.server_url = url;
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn upload_policy(&self) -> UploadPolicy {
        UploadPolicy {
            max_files: self.max_files,
            allowed_types: self.allowed_types.clone(),
            chunk_size: self.chunk_size,
        }
    }

    /// The last-directory store, if a location can be determined.
    pub fn last_dir_store(&self) -> Option<LastDirStore> {
        let path = if self.state_file.is_empty() {
            default_state_path()?
        } else {
            PathBuf::from(&self.state_file)
        };
        Some(LastDirStore::new(path))
    }
}

/// Sign-in credentials taken from flags or the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    /// Flag values win over `QSFM_USER` / `QSFM_PASSWORD`. Both parts must
    /// be present.
    pub fn resolve(
        user: Option<String>,
        password: Option<String>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Option<Self> {
        let user = user.or_else(|| lookup("QSFM_USER"))?;
        let password = password.or_else(|| lookup("QSFM_PASSWORD"))?;
        if user.is_empty() {
            return None;
        }
        Some(Self { user, password })
    }
}

/// Returns the platform-specific configuration file path.
pub fn config_path() -> anyhow::Result<PathBuf> {
    config_dir()
        .map(|d| d.join("qsfm").join("client.toml"))
        .ok_or_else(|| anyhow::anyhow!("cannot determine the configuration directory"))
}
