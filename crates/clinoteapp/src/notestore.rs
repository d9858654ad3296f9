//! The remote note store.
//!
//! Notes and notebooks are owned by the remote service. This crate never talks
//! to it directly; commands go through [`NoteStoreClient`], which the embedding
//! application implements on top of its protocol client. Every method returns
//! the service failure as [`ClinoteError::Remote`](crate::error::ClinoteError::Remote)
//! or any other crate error.

use crate::error::Result;
use crate::model::{Note, NoteFilter, Notebook};

pub trait NoteStoreClient {
    /// Notes matching `filter`, at most `count` starting at `offset`.
    /// Returned notes carry metadata only; the body is fetched with
    /// [`get_note_content`](Self::get_note_content).
    fn find_notes(&self, filter: &NoteFilter, offset: usize, count: usize) -> Result<Vec<Note>>;

    fn get_all_notebooks(&self) -> Result<Vec<Notebook>>;

    fn get_notebook(&self, guid: &str) -> Result<Notebook>;

    /// Creates a notebook, optionally making it the account default.
    fn create_notebook(&self, notebook: &Notebook, default: bool) -> Result<()>;

    fn update_notebook(&self, notebook: &Notebook) -> Result<()>;

    /// The full note body as stored remotely, envelope included.
    fn get_note_content(&self, guid: &str) -> Result<String>;

    fn create_note(&self, note: &Note) -> Result<()>;

    fn update_note(&self, note: &Note) -> Result<()>;

    fn delete_note(&self, guid: &str) -> Result<()>;
}
