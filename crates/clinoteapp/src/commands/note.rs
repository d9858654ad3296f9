//! Note lookup and remote note operations.
//!
//! ## Addressing Notes
//!
//! Every command that takes a note "title" also accepts an ordinal: a positive
//! integer `n` picks the n-th note (1-based) of the last saved search. An ordinal
//! past the end of the saved search is treated as a title, so a note called
//! "2024" stays reachable. Anything else, `0` included, is looked up remotely by
//! exact title; no match is [`ClinoteError::NoNoteFound`].

use super::notebook::find_notebook;
use crate::config::ClinoteConfig;
use crate::error::{ClinoteError, Result};
use crate::markup::{unwrap_note_body, wrap_note_body, MarkupCodec};
use crate::model::{Note, NoteFilter};
use crate::notestore::NoteStoreClient;
use crate::store::backend::StorageBackend;
use crate::store::Database;

/// Searches the remote store and saves the result for ordinal addressing.
pub fn find_notes<B: StorageBackend, N: NoteStoreClient>(
    db: &mut Database<B>,
    ns: &N,
    filter: &NoteFilter,
    offset: usize,
    count: usize,
) -> Result<Vec<Note>> {
    let notes = ns.find_notes(filter, offset, count)?;
    db.save_search(&notes)?;
    log::debug!("saved search with {} notes", notes.len());
    Ok(notes)
}

fn parse_ordinal(title: &str) -> Option<usize> {
    title.parse::<usize>().ok().filter(|&n| n > 0)
}

/// Resolves a title or ordinal to note metadata (no content).
///
/// `notebook` restricts a title search to that notebook.
pub fn get_note<B: StorageBackend, N: NoteStoreClient>(
    db: &mut Database<B>,
    ns: &N,
    config: &ClinoteConfig,
    title: &str,
    notebook: Option<&str>,
) -> Result<Note> {
    if let Some(index) = parse_ordinal(title) {
        let mut notes = db.get_search()?;
        if index <= notes.len() {
            log::debug!("resolved note #{} from the saved search", index);
            return Ok(notes.swap_remove(index - 1));
        }
        log::debug!(
            "#{} is past the saved search ({} notes), searching by title",
            index,
            notes.len()
        );
    }

    let mut filter = NoteFilter {
        words: title.to_string(),
        ..Default::default()
    };
    if let Some(name) = notebook.filter(|n| !n.is_empty()) {
        filter.notebook_guid = find_notebook(db, ns, config, name)?.guid;
    }

    ns.find_notes(&filter, 0, config.search_page_size)?
        .into_iter()
        .find(|n| n.title == title)
        .ok_or(ClinoteError::NoNoteFound)
}

/// Like [`get_note`], with the body fetched, unwrapped and converted to markdown.
pub fn get_note_with_content<B, N, C>(
    db: &mut Database<B>,
    ns: &N,
    codec: &C,
    config: &ClinoteConfig,
    title: &str,
) -> Result<Note>
where
    B: StorageBackend,
    N: NoteStoreClient,
    C: MarkupCodec + ?Sized,
{
    let mut note = get_note(db, ns, config, title, None)?;
    let content = ns.get_note_content(&note.guid)?;
    note.body = unwrap_note_body(&content)?;
    note.md = codec.to_markdown(&note.body)?;
    Ok(note)
}

pub fn change_title<B: StorageBackend, N: NoteStoreClient>(
    db: &mut Database<B>,
    ns: &N,
    config: &ClinoteConfig,
    old: &str,
    new: &str,
) -> Result<Note> {
    let mut note = get_note(db, ns, config, old, None)?;
    note.title = new.to_string();
    ns.update_note(&note)?;
    Ok(note)
}

pub fn move_note<B: StorageBackend, N: NoteStoreClient>(
    db: &mut Database<B>,
    ns: &N,
    config: &ClinoteConfig,
    title: &str,
    notebook: &str,
) -> Result<Note> {
    let mut note = get_note(db, ns, config, title, None)?;
    note.notebook = Some(find_notebook(db, ns, config, notebook)?);
    ns.update_note(&note)?;
    Ok(note)
}

/// Moves the note to the remote trash.
pub fn delete_note<B: StorageBackend, N: NoteStoreClient>(
    db: &mut Database<B>,
    ns: &N,
    config: &ClinoteConfig,
    title: &str,
    notebook: Option<&str>,
) -> Result<Note> {
    let note = get_note(db, ns, config, title, notebook)?;
    ns.delete_note(&note.guid)?;
    Ok(note)
}

/// Renders the note's markup (from `md`, or `body` as is when `raw`) without
/// the envelope. Stored on the note so a recovery point carries it.
pub(crate) fn render_body<C: MarkupCodec + ?Sized>(codec: &C, note: &mut Note, raw: bool) {
    if !raw {
        note.body = if note.md.is_empty() {
            String::new()
        } else {
            codec.to_markup(&note.md)
        };
    }
}

/// The note as sent to the remote store: same fields, body wrapped.
pub(crate) fn outgoing(note: &Note) -> Note {
    Note {
        body: wrap_note_body(&note.body),
        ..note.clone()
    }
}

/// Creates `note` remotely. Raw mode sends `body` as markup, otherwise `md` is rendered.
pub fn save_new_note<N, C>(ns: &N, codec: &C, note: &mut Note, raw: bool) -> Result<()>
where
    N: NoteStoreClient,
    C: MarkupCodec + ?Sized,
{
    render_body(codec, note, raw);
    ns.create_note(&outgoing(note))
}
