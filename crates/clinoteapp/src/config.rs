//! # Configuration
//!
//! Clinote configuration is a [`confique`] struct, resolved once at startup and
//! then passed explicitly to whatever needs it. There is no global session or
//! client state.
//!
//! ## Resolution Order
//!
//! 1. **Environment variables**: `CLINOTE_NOTEBOOK_CACHE_HOURS`, `CLINOTE_DB_FILE_NAME`, etc.
//! 2. **Config file**: `clinote.toml` in the config folder.
//! 3. **Compiled defaults**: via `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `notebook_cache_hours` | `24` | Age after which the cached notebook list is refreshed |
//! | `db_file_name` | `clinote.db` | Store file name inside the config folder |
//! | `lock_timeout_ms` | `5000` | How long to wait for a store locked by another process |
//! | `search_page_size` | `20` | Notes requested per remote title lookup |
//!
//! ## Folders
//!
//! The config folder (store file, `clinote.toml`) and the cache folder (edit
//! buffers) come from the OS conventions via the `directories` crate. Setting
//! `CLINOTE_DATA` puts both under that one directory instead.

use crate::error::{ClinoteError, Result};
use confique::Config;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE_NAME: &str = "clinote.toml";

/// Configuration for clinote, stored in `clinote.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ClinoteConfig {
    /// Hours before the cached notebook list is considered outdated.
    #[config(env = "CLINOTE_NOTEBOOK_CACHE_HOURS", default = 24)]
    pub notebook_cache_hours: u64,

    /// File name of the store inside the config folder.
    #[config(env = "CLINOTE_DB_FILE_NAME", default = "clinote.db")]
    pub db_file_name: String,

    /// Milliseconds to wait on a store file locked by another process.
    #[config(env = "CLINOTE_LOCK_TIMEOUT_MS", default = 5000)]
    pub lock_timeout_ms: u64,

    /// Number of notes requested when looking a note up by title.
    #[config(env = "CLINOTE_SEARCH_PAGE_SIZE", default = 20)]
    pub search_page_size: usize,
}

impl Default for ClinoteConfig {
    fn default() -> Self {
        Self {
            notebook_cache_hours: 24,
            db_file_name: "clinote.db".to_string(),
            lock_timeout_ms: 5000,
            search_page_size: 20,
        }
    }
}

impl ClinoteConfig {
    /// Loads from the environment layered over `file` (if it exists) and defaults.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = Self::builder().env();
        if let Some(path) = file {
            builder = builder.file(path);
        }
        builder
            .load()
            .map_err(|e| ClinoteError::Config(e.to_string()))
    }

    pub fn notebook_cache_limit(&self) -> Duration {
        Duration::from_secs(self.notebook_cache_hours.saturating_mul(60 * 60))
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

/// Folders used by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClinotePaths {
    pub config_dir: PathBuf,
    pub cache_dir: PathBuf,
}

impl ClinotePaths {
    pub fn resolve() -> Result<Self> {
        if let Ok(dir) = std::env::var("CLINOTE_DATA") {
            if !dir.is_empty() {
                return Ok(Self::under(Path::new(&dir)));
            }
        }
        let dirs = ProjectDirs::from("com", "clinote", "clinote").ok_or_else(|| {
            ClinoteError::Config("could not determine the user's config directory".to_string())
        })?;
        Ok(Self {
            config_dir: dirs.config_dir().to_path_buf(),
            cache_dir: dirs.cache_dir().to_path_buf(),
        })
    }

    /// Both folders under one root, used for `CLINOTE_DATA` and in tests.
    pub fn under(root: &Path) -> Self {
        Self {
            config_dir: root.join("config"),
            cache_dir: root.join("cache"),
        }
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }

    /// Creates both folders if they do not exist yet.
    pub fn ensure(&self) -> Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.cache_dir)?;
        Ok(())
    }
}

/// Options fixed when the client is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientOptions {
    /// Talk to the sandbox service instead of production.
    pub sandbox: bool,
    /// Edit with vim instead of `$EDITOR`.
    pub vim_editor: bool,
}

/// Options for a single note edit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoteOptions {
    /// Edit the raw markup body instead of the markdown.
    pub raw: bool,
    /// Start from the stored recovery point instead of the remote note.
    pub recover: bool,
}
