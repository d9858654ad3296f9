//! Test doubles for the remote note store and the editor.

use crate::editor::Editor;
use crate::error::{ClinoteError, Result};
use crate::markup::wrap_note_body;
use crate::model::{Note, NoteFilter, Notebook};
use crate::notestore::NoteStoreClient;
use crate::store::mem_backend::MemBackend;
use crate::store::Database;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

pub fn mem_db() -> Database<MemBackend> {
    Database::with_backend(MemBackend::new()).expect("in-memory store opens")
}

pub fn notebook(name: &str, guid: &str) -> Notebook {
    Notebook {
        name: name.to_string(),
        guid: guid.to_string(),
        stack: String::new(),
    }
}

pub fn note(title: &str, guid: &str) -> Note {
    Note {
        title: title.to_string(),
        guid: guid.to_string(),
        ..Default::default()
    }
}

/// In-memory remote note store that records every call.
#[derive(Default)]
pub struct MockNoteStore {
    pub notebooks: RefCell<Vec<Notebook>>,
    pub notes: RefCell<Vec<Note>>,
    /// Wrapped note content by GUID.
    pub contents: RefCell<HashMap<String, String>>,

    pub notebook_list_calls: Cell<usize>,
    pub content_calls: Cell<usize>,
    pub find_calls: RefCell<Vec<(NoteFilter, usize, usize)>>,
    pub created_notebooks: RefCell<Vec<(Notebook, bool)>>,
    pub updated_notebooks: RefCell<Vec<Notebook>>,
    pub created_notes: RefCell<Vec<Note>>,
    pub updated_notes: RefCell<Vec<Note>>,
    pub deleted_notes: RefCell<Vec<String>>,

    pub fail_update: Cell<bool>,
    pub fail_notebook_update: Cell<bool>,
}

impl MockNoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_notebooks(self, notebooks: Vec<Notebook>) -> Self {
        *self.notebooks.borrow_mut() = notebooks;
        self
    }

    /// Adds a note whose stored content is `body` inside the note envelope.
    pub fn with_note(self, note: Note, body: &str) -> Self {
        self.contents
            .borrow_mut()
            .insert(note.guid.clone(), wrap_note_body(body));
        self.notes.borrow_mut().push(note);
        self
    }

    pub fn set_fail_update(&self, fail: bool) {
        self.fail_update.set(fail);
    }

    pub fn set_fail_notebook_update(&self, fail: bool) {
        self.fail_notebook_update.set(fail);
    }

    pub fn update_calls(&self) -> usize {
        self.updated_notes.borrow().len()
    }
}

impl NoteStoreClient for MockNoteStore {
    fn find_notes(&self, filter: &NoteFilter, offset: usize, count: usize) -> Result<Vec<Note>> {
        self.find_calls
            .borrow_mut()
            .push((filter.clone(), offset, count));
        Ok(self
            .notes
            .borrow()
            .iter()
            .filter(|n| filter.words.is_empty() || n.title.contains(&filter.words))
            .filter(|n| {
                filter.notebook_guid.is_empty()
                    || n.notebook_guid() == Some(filter.notebook_guid.as_str())
            })
            .skip(offset)
            .take(count)
            .cloned()
            .collect())
    }

    fn get_all_notebooks(&self) -> Result<Vec<Notebook>> {
        self.notebook_list_calls
            .set(self.notebook_list_calls.get() + 1);
        Ok(self.notebooks.borrow().clone())
    }

    fn get_notebook(&self, guid: &str) -> Result<Notebook> {
        self.notebooks
            .borrow()
            .iter()
            .find(|nb| nb.guid == guid)
            .cloned()
            .ok_or_else(|| ClinoteError::Remote(format!("no notebook with guid {}", guid)))
    }

    fn create_notebook(&self, notebook: &Notebook, default: bool) -> Result<()> {
        self.created_notebooks
            .borrow_mut()
            .push((notebook.clone(), default));
        Ok(())
    }

    fn update_notebook(&self, notebook: &Notebook) -> Result<()> {
        self.updated_notebooks.borrow_mut().push(notebook.clone());
        if self.fail_notebook_update.get() {
            return Err(ClinoteError::Remote("notebook update rejected".to_string()));
        }
        Ok(())
    }

    fn get_note_content(&self, guid: &str) -> Result<String> {
        self.content_calls.set(self.content_calls.get() + 1);
        self.contents
            .borrow()
            .get(guid)
            .cloned()
            .ok_or_else(|| ClinoteError::Remote(format!("no content for {}", guid)))
    }

    fn create_note(&self, note: &Note) -> Result<()> {
        self.created_notes.borrow_mut().push(note.clone());
        Ok(())
    }

    fn update_note(&self, note: &Note) -> Result<()> {
        self.updated_notes.borrow_mut().push(note.clone());
        if self.fail_update.get() {
            return Err(ClinoteError::Remote("update rejected".to_string()));
        }
        Ok(())
    }

    fn delete_note(&self, guid: &str) -> Result<()> {
        self.deleted_notes.borrow_mut().push(guid.to_string());
        Ok(())
    }
}

/// Editor double that replies with a fixed buffer, or echoes its input.
#[derive(Default)]
pub struct ScriptedEditor {
    reply: Option<String>,
    fail: bool,
    pub seen: RefCell<Vec<String>>,
}

impl ScriptedEditor {
    /// Returns the buffer untouched.
    pub fn unchanged() -> Self {
        Self::default()
    }

    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Some(reply.into()),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }
}

impl Editor for ScriptedEditor {
    fn edit(&self, buffer: &str) -> Result<String> {
        self.seen.borrow_mut().push(buffer.to_string());
        if self.fail {
            return Err(ClinoteError::Editor("editor crashed".to_string()));
        }
        Ok(self.reply.clone().unwrap_or_else(|| buffer.to_string()))
    }
}
