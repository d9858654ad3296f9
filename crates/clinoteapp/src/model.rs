//! # Domain Model
//!
//! Core data types shared by the store, the commands and the remote collaborator:
//! [`Note`], [`Notebook`], [`NotebookCacheList`], [`Credential`] and [`Settings`].
//!
//! ## Change Detection
//!
//! A note is edited as a single text buffer:
//!
//! ```text
//! Title Line     <-- Line 1
//!                <-- Line 2 (blank separator)
//! Body Content   <-- Line 3+ (markdown, or raw markup in raw mode)
//! ```
//!
//! The [`Fingerprint`] of that buffer is taken when the note is loaded and again
//! after the editor closes. Equal fingerprints mean "no changes": nothing is sent
//! to the remote note store and no recovery point is written. The fingerprint is
//! a BLAKE3 digest and is only ever used for this comparison.
//!
//! ## Notebook Cache Staleness
//!
//! [`NotebookCacheList::is_outdated`] is `(now - timestamp) > limit`. A list exactly
//! `limit` old is still fresh.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Separator between the title line and the body in the edit buffer.
pub const TITLE_SEPARATOR: &str = "\n\n";

/// Default staleness limit of the notebook cache.
pub const DEFAULT_NOTEBOOK_CACHE_TIME: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notebook {
    pub name: String,
    /// Remote-assigned identifier, empty for an unsaved notebook.
    #[serde(default)]
    pub guid: String,
    #[serde(default)]
    pub stack: String,
}

impl Notebook {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Fixed-size content digest used to detect edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(pub [u8; 32]);

impl Fingerprint {
    pub fn of(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Fingerprint of `title + separator + content`, the same bytes the editor
    /// buffer holds before any edit.
    pub fn of_note_text(title: &str, content: &str) -> Self {
        Self::of(edit_buffer(title, content).as_bytes())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub title: String,
    #[serde(default)]
    pub guid: String,
    /// Raw markup body, the inner content of the note envelope.
    #[serde(default)]
    pub body: String,
    /// Markdown derived from `body`.
    #[serde(default)]
    pub md: String,
    #[serde(default)]
    pub md_hash: Option<Fingerprint>,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub notebook: Option<Notebook>,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated: Option<DateTime<Utc>>,
}

impl Note {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// The text edited by the user: the markdown, or the raw body in raw mode.
    pub fn editable_content(&self, raw: bool) -> &str {
        if raw {
            &self.body
        } else {
            &self.md
        }
    }

    /// Records the fingerprint of the current editable text.
    pub fn mark_loaded(&mut self, raw: bool) -> Fingerprint {
        let hash = Fingerprint::of_note_text(&self.title, self.editable_content(raw));
        self.md_hash = Some(hash);
        hash
    }

    /// Applies an edited buffer: first line is the title, the rest the content.
    pub fn apply_buffer(&mut self, buffer: &str, raw: bool) {
        let parsed = EditorContent::from_buffer(buffer);
        self.title = parsed.title;
        if raw {
            self.body = parsed.content;
        } else {
            self.md = parsed.content;
        }
    }

    pub fn notebook_guid(&self) -> Option<&str> {
        self.notebook.as_ref().map(|nb| nb.guid.as_str())
    }
}

/// Formats a title and content as an edit buffer.
pub fn edit_buffer(title: &str, content: &str) -> String {
    format!("{}{}{}", title, TITLE_SEPARATOR, content)
}

/// Represents the content parsed from an editor buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorContent {
    pub title: String,
    pub content: String,
}

impl EditorContent {
    /// Parses an editor buffer back into title and content.
    /// The blank line after the title is skipped when present.
    pub fn from_buffer(buffer: &str) -> Self {
        let (title, rest) = match buffer.split_once('\n') {
            Some((title, rest)) => (title, rest),
            None => (buffer, ""),
        };
        let content = rest
            .strip_prefix("\r\n")
            .or_else(|| rest.strip_prefix('\n'))
            .unwrap_or(rest);

        Self {
            title: title.trim_end_matches('\r').to_string(),
            content: content.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NoteOrder {
    Created,
    Updated,
    #[default]
    Relevance,
    SequenceNumber,
    Title,
}

/// Search filter passed to the remote note store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteFilter {
    /// Restricts the search to one notebook when non-empty.
    pub notebook_guid: String,
    /// Search string or note title.
    pub words: String,
    pub order: NoteOrder,
}

/// Time-bounded snapshot of the user's notebook list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotebookCacheList {
    pub notebooks: Vec<Notebook>,
    pub timestamp: DateTime<Utc>,
    pub limit: Duration,
}

impl NotebookCacheList {
    pub fn new(notebooks: Vec<Notebook>) -> Self {
        Self::with_limit(notebooks, DEFAULT_NOTEBOOK_CACHE_TIME)
    }

    pub fn with_limit(notebooks: Vec<Notebook>, limit: Duration) -> Self {
        Self::created_at(notebooks, Utc::now(), limit)
    }

    pub fn created_at(notebooks: Vec<Notebook>, timestamp: DateTime<Utc>, limit: Duration) -> Self {
        Self {
            notebooks,
            timestamp,
            limit,
        }
    }

    /// Stand-in for a cache that was never stored: empty and already outdated.
    pub fn empty() -> Self {
        Self::created_at(Vec::new(), DateTime::<Utc>::UNIX_EPOCH, Duration::ZERO)
    }

    pub fn is_outdated(&self) -> bool {
        self.is_outdated_at(Utc::now())
    }

    pub fn is_outdated_at(&self, now: DateTime<Utc>) -> bool {
        match chrono::Duration::from_std(self.limit) {
            Ok(limit) => now.signed_duration_since(self.timestamp) > limit,
            // A limit too large to represent never expires.
            Err(_) => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CredentialType {
    #[default]
    Primary,
    Sandbox,
}

impl fmt::Display for CredentialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialType::Primary => write!(f, "Evernote"),
            CredentialType::Sandbox => write!(f, "Evernote Sandbox"),
        }
    }
}

/// A named authentication credential.
///
/// Removal by object compares all three fields, so two credentials with the same
/// name, secret and type cannot be told apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub name: String,
    pub secret: String,
    #[serde(default)]
    pub cred_type: CredentialType,
}

impl Credential {
    pub fn new(name: impl Into<String>, secret: impl Into<String>, cred_type: CredentialType) -> Self {
        Self {
            name: name.into(),
            secret: secret.into(),
            cred_type,
        }
    }
}

/// Application settings, a single record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Active session key. Older stores wrote it as `APIKey`.
    #[serde(default, alias = "APIKey")]
    pub api_key: String,
    /// The credential the active key was taken from, if it was selected from the list.
    #[serde(default)]
    pub credential: Option<Credential>,
}
