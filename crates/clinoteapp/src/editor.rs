//! External editor integration.
//!
//! The edit workflow only needs "give the user this text, get text back", which
//! is the [`Editor`] trait. [`ExternalEditor`] writes the buffer to a uniquely
//! named file in the cache folder, runs the editor on it, reads the file back
//! and removes it. [`EnvEditor`] looks up `$EDITOR` / `$VISUAL` when an edit
//! starts, so a client can be built without an editor configured.

use crate::error::{ClinoteError, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use uuid::Uuid;

pub const VIM_COMMAND: &str = "vim";

pub trait Editor {
    /// Lets the user edit `buffer` and returns the edited text.
    fn edit(&self, buffer: &str) -> Result<String>;
}

/// Picks `$EDITOR`, then `$VISUAL`. Empty values are skipped.
pub fn resolve_editor_command(editor: Option<String>, visual: Option<String>) -> Result<String> {
    editor
        .filter(|e| !e.trim().is_empty())
        .or_else(|| visual.filter(|v| !v.trim().is_empty()))
        .ok_or(ClinoteError::NoEditorFound)
}

#[derive(Debug, Clone)]
pub struct ExternalEditor {
    command: String,
    cache_dir: PathBuf,
}

impl ExternalEditor {
    /// `command` may carry arguments, e.g. `code --wait`.
    pub fn new(command: impl Into<String>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            cache_dir: cache_dir.into(),
        }
    }

    pub fn vim(cache_dir: impl Into<PathBuf>) -> Self {
        Self::new(VIM_COMMAND, cache_dir)
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    fn run(&self, path: &Path) -> Result<()> {
        let mut parts = self.command.split_whitespace();
        let program = parts.next().ok_or(ClinoteError::NoEditorFound)?;

        let status = Command::new(program)
            .args(parts)
            .arg(path)
            .status()
            .map_err(|e| {
                ClinoteError::Editor(format!("failed to launch '{}': {}", self.command, e))
            })?;

        if !status.success() {
            return Err(ClinoteError::Editor(format!(
                "'{}' exited with {}",
                self.command, status
            )));
        }
        Ok(())
    }
}

impl Editor for ExternalEditor {
    fn edit(&self, buffer: &str) -> Result<String> {
        fs::create_dir_all(&self.cache_dir)?;
        let path = self
            .cache_dir
            .join(format!("clinote-{}.md", Uuid::new_v4()));
        fs::write(&path, buffer)?;
        log::debug!("editing {} with {}", path.display(), self.command);

        let result = self
            .run(&path)
            .and_then(|_| fs::read_to_string(&path).map_err(ClinoteError::from));

        if let Err(e) = fs::remove_file(&path) {
            log::warn!("could not remove edit buffer {}: {}", path.display(), e);
        }
        result
    }
}

/// Runs whatever editor the environment names at the time of the edit.
#[derive(Debug, Clone)]
pub struct EnvEditor {
    cache_dir: PathBuf,
}

impl EnvEditor {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }
}

impl Editor for EnvEditor {
    fn edit(&self, buffer: &str) -> Result<String> {
        let command = resolve_editor_command(env::var("EDITOR").ok(), env::var("VISUAL").ok())?;
        ExternalEditor::new(command, self.cache_dir.clone()).edit(buffer)
    }
}
