#![allow(dead_code)]

use clinoteapp::editor::Editor;
use clinoteapp::error::{ClinoteError, Result};
use clinoteapp::markup::wrap_note_body;
use clinoteapp::model::{Note, NoteFilter, Notebook};
use clinoteapp::notestore::NoteStoreClient;
use std::cell::{Cell, RefCell};

/// Remote store stub holding a fixed set of notebooks and notes.
#[derive(Default)]
pub struct RemoteStub {
    pub notebooks: RefCell<Vec<Notebook>>,
    pub notes: Vec<(Note, String)>,
    pub notebook_calls: Cell<usize>,
    pub updates: RefCell<Vec<Note>>,
    pub fail_updates: Cell<bool>,
}

impl RemoteStub {
    pub fn with_notebooks(names: &[&str]) -> Self {
        let notebooks = names
            .iter()
            .enumerate()
            .map(|(i, name)| Notebook {
                name: name.to_string(),
                guid: format!("nb-{}", i + 1),
                stack: String::new(),
            })
            .collect();
        Self {
            notebooks: RefCell::new(notebooks),
            ..Default::default()
        }
    }

    pub fn add_note(&mut self, title: &str, guid: &str, body: &str) {
        let note = Note {
            title: title.to_string(),
            guid: guid.to_string(),
            ..Default::default()
        };
        self.notes.push((note, wrap_note_body(body)));
    }
}

impl NoteStoreClient for RemoteStub {
    fn find_notes(&self, filter: &NoteFilter, offset: usize, count: usize) -> Result<Vec<Note>> {
        Ok(self
            .notes
            .iter()
            .map(|(n, _)| n)
            .filter(|n| n.title.contains(&filter.words))
            .skip(offset)
            .take(count)
            .cloned()
            .collect())
    }

    fn get_all_notebooks(&self) -> Result<Vec<Notebook>> {
        self.notebook_calls.set(self.notebook_calls.get() + 1);
        Ok(self.notebooks.borrow().clone())
    }

    fn get_notebook(&self, guid: &str) -> Result<Notebook> {
        self.notebooks
            .borrow()
            .iter()
            .find(|nb| nb.guid == guid)
            .cloned()
            .ok_or_else(|| ClinoteError::Remote("unknown notebook".to_string()))
    }

    fn create_notebook(&self, notebook: &Notebook, _default: bool) -> Result<()> {
        self.notebooks.borrow_mut().push(notebook.clone());
        Ok(())
    }

    fn update_notebook(&self, _notebook: &Notebook) -> Result<()> {
        Ok(())
    }

    fn get_note_content(&self, guid: &str) -> Result<String> {
        self.notes
            .iter()
            .find(|(n, _)| n.guid == guid)
            .map(|(_, content)| content.clone())
            .ok_or_else(|| ClinoteError::Remote("unknown note".to_string()))
    }

    fn create_note(&self, _note: &Note) -> Result<()> {
        Ok(())
    }

    fn update_note(&self, note: &Note) -> Result<()> {
        self.updates.borrow_mut().push(note.clone());
        if self.fail_updates.get() {
            return Err(ClinoteError::Remote("service unavailable".to_string()));
        }
        Ok(())
    }

    fn delete_note(&self, _guid: &str) -> Result<()> {
        Ok(())
    }
}

/// Editor that swaps the buffer for a fixed reply, or leaves it alone.
pub struct FixedEditor(pub Option<String>);

impl Editor for FixedEditor {
    fn edit(&self, buffer: &str) -> Result<String> {
        Ok(self.0.clone().unwrap_or_else(|| buffer.to_string()))
    }
}
