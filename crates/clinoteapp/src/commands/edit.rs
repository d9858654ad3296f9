//! # Editing Notes
//!
//! ```text
//! load (remote, or recovery point) -> fingerprint -> editor -> fingerprint
//!   equal:   nothing is sent, nothing is stored
//!   changed: update remote
//!              ok:     done (recover mode also clears the recovery point)
//!              failed: store the edited note as the recovery point
//!                        ok:     the remote error is returned
//!                        failed: RecoveryFailed carrying both errors
//! ```
//!
//! In recover mode the note comes from the recovery point and is saved even if
//! the buffer comes back unchanged, since that text never reached the remote
//! store.

use super::note::{get_note_with_content, outgoing, render_body};
use crate::config::{ClinoteConfig, NoteOptions};
use crate::editor::Editor;
use crate::error::{ClinoteError, Result};
use crate::markup::MarkupCodec;
use crate::model::{edit_buffer, Fingerprint, Note};
use crate::notestore::NoteStoreClient;
use crate::store::backend::StorageBackend;
use crate::store::Database;

pub const UNTITLED_NOTE: &str = "Untitled note";

#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    /// The buffer came back unchanged; nothing was sent.
    Unchanged,
    Saved(Note),
}

fn load_recovery_point<B: StorageBackend>(db: &mut Database<B>) -> Result<Note> {
    db.get_recovery_point()?
        .filter(|note| !note.guid.is_empty())
        .ok_or(ClinoteError::NoRecoveryPoint)
}

pub fn edit_note<B, N, E, C>(
    db: &mut Database<B>,
    ns: &N,
    editor: &E,
    codec: &C,
    config: &ClinoteConfig,
    title: &str,
    opts: NoteOptions,
) -> Result<EditOutcome>
where
    B: StorageBackend,
    N: NoteStoreClient,
    E: Editor + ?Sized,
    C: MarkupCodec + ?Sized,
{
    let mut note = if opts.recover {
        log::info!("editing the recovery point");
        load_recovery_point(db)?
    } else {
        get_note_with_content(db, ns, codec, config, title)?
    };

    let loaded = note.mark_loaded(opts.raw);
    let edited = editor.edit(&edit_buffer(&note.title, note.editable_content(opts.raw)))?;

    if !opts.recover && Fingerprint::of(edited.as_bytes()) == loaded {
        log::info!("no changes to '{}'", note.title);
        return Ok(EditOutcome::Unchanged);
    }

    if !opts.raw && !codec.is_lossless() && note.body.contains('<') {
        log::warn!(
            "'{}' is saved as plain paragraphs; edit in raw mode to keep its formatting",
            note.title
        );
    }
    note.apply_buffer(&edited, opts.raw);
    save_changes(db, ns, codec, &mut note, opts.raw)?;

    if opts.recover {
        db.clear_recovery_point()?;
    }
    Ok(EditOutcome::Saved(note))
}

/// Sends an edited note, falling back to the recovery point when the remote
/// update fails.
pub fn save_changes<B, N, C>(
    db: &mut Database<B>,
    ns: &N,
    codec: &C,
    note: &mut Note,
    raw: bool,
) -> Result<()>
where
    B: StorageBackend,
    N: NoteStoreClient,
    C: MarkupCodec + ?Sized,
{
    render_body(codec, note, raw);
    let save = match ns.update_note(&outgoing(note)) {
        Ok(()) => return Ok(()),
        Err(e) => e,
    };

    log::warn!("saving '{}' failed: {}", note.title, save);
    match db.save_recovery_point(note) {
        Ok(()) => {
            log::info!("recovery point stored for '{}'", note.title);
            Err(save)
        }
        Err(recovery) => {
            log::error!("storing the recovery point failed: {}", recovery);
            Err(ClinoteError::RecoveryFailed {
                save: Box::new(save),
                recovery: Box::new(recovery),
            })
        }
    }
}

/// Lets the user write a new note in the editor and creates it remotely.
pub fn create_note_in_editor<N, E, C>(
    ns: &N,
    editor: &E,
    codec: &C,
    title: Option<&str>,
    raw: bool,
) -> Result<Note>
where
    N: NoteStoreClient,
    E: Editor + ?Sized,
    C: MarkupCodec + ?Sized,
{
    let mut note = Note::new(title.filter(|t| !t.is_empty()).unwrap_or(UNTITLED_NOTE));
    let edited = editor.edit(&edit_buffer(&note.title, ""))?;
    note.apply_buffer(&edited, raw);
    super::note::save_new_note(ns, codec, &mut note, raw)?;
    Ok(note)
}
