//! # Client Facade
//!
//! [`Client`] is the single entry point for a front end. It owns everything a
//! command needs: the resolved configuration, the store, the remote note store,
//! the editor and the markup codec. A client is built once per process and
//! passed around explicitly.
//!
//! ## Role and Responsibilities
//!
//! The facade:
//! - **Dispatches** to the command functions in [`crate::commands`]
//! - **Applies client options** (sandbox credentials, vim instead of `$EDITOR`)
//! - **Closes the store** through [`Client::close`], which a front end calls on
//!   every exit path
//!
//! Business logic stays in the commands.
//!
//! ## Generic Over Backends
//!
//! `Client<B: StorageBackend, N: NoteStoreClient>`:
//! - Production: `Client<SqliteBackend, YourRemoteClient>` via [`Client::open`]
//! - Testing: `Client<MemBackend, MockNoteStore>` via [`Client::new`]

use crate::commands::{self, edit::EditOutcome, notebook::NotebookPatch};
use crate::config::{ClientOptions, ClinoteConfig, ClinotePaths, NoteOptions};
use crate::editor::{Editor, EnvEditor, ExternalEditor};
use crate::error::Result;
use crate::markup::{MarkupCodec, PlainTextCodec};
use crate::model::{Credential, CredentialType, Note, NoteFilter, Notebook, Settings};
use crate::notestore::NoteStoreClient;
use crate::store::backend::StorageBackend;
use crate::store::sqlite_backend::SqliteBackend;
use crate::store::Database;

pub struct Client<B: StorageBackend, N: NoteStoreClient> {
    config: ClinoteConfig,
    options: ClientOptions,
    db: Database<B>,
    notestore: N,
    editor: Box<dyn Editor>,
    codec: Box<dyn MarkupCodec>,
}

impl<N: NoteStoreClient> Client<SqliteBackend, N> {
    /// Loads `clinote.toml`, opens (and migrates) the store in the config folder
    /// and picks the editor from `options`.
    pub fn open(paths: &ClinotePaths, options: ClientOptions, notestore: N) -> Result<Self> {
        paths.ensure()?;
        let config = ClinoteConfig::load(Some(&paths.config_file()))?;
        let db = Database::open(&paths.config_dir, &config)?;
        let editor: Box<dyn Editor> = if options.vim_editor {
            Box::new(ExternalEditor::vim(&paths.cache_dir))
        } else {
            Box::new(EnvEditor::new(&paths.cache_dir))
        };
        log::debug!("client ready (sandbox: {})", options.sandbox);
        Ok(Self::new(
            config,
            options,
            db,
            notestore,
            editor,
            Box::new(PlainTextCodec),
        ))
    }
}

impl<B: StorageBackend, N: NoteStoreClient> Client<B, N> {
    pub fn new(
        config: ClinoteConfig,
        options: ClientOptions,
        db: Database<B>,
        notestore: N,
        editor: Box<dyn Editor>,
        codec: Box<dyn MarkupCodec>,
    ) -> Self {
        Self {
            config,
            options,
            db,
            notestore,
            editor,
            codec,
        }
    }

    pub fn config(&self) -> &ClinoteConfig {
        &self.config
    }

    pub fn options(&self) -> ClientOptions {
        self.options
    }

    pub fn notestore(&self) -> &N {
        &self.notestore
    }

    pub fn database(&mut self) -> &mut Database<B> {
        &mut self.db
    }

    /// Flushes and releases the store.
    pub fn close(self) -> Result<()> {
        self.db.close()
    }

    // --- Notebooks ---

    pub fn get_notebooks(&mut self, force_sync: bool) -> Result<Vec<Notebook>> {
        commands::notebook::get_notebooks(&mut self.db, &self.notestore, &self.config, force_sync)
    }

    pub fn find_notebook(&mut self, name: &str) -> Result<Notebook> {
        commands::notebook::find_notebook(&mut self.db, &self.notestore, &self.config, name)
    }

    pub fn get_notebook(&self, guid: &str) -> Result<Notebook> {
        commands::notebook::get_notebook(&self.notestore, guid)
    }

    pub fn create_notebook(&self, notebook: &Notebook, default: bool) -> Result<()> {
        commands::notebook::create_notebook(&self.notestore, notebook, default)
    }

    pub fn update_notebook(&mut self, name: &str, patch: &NotebookPatch) -> Result<Notebook> {
        commands::notebook::update_notebook(&mut self.db, &self.notestore, &self.config, name, patch)
    }

    // --- Notes ---

    pub fn find_notes(&mut self, filter: &NoteFilter, offset: usize, count: usize) -> Result<Vec<Note>> {
        commands::note::find_notes(&mut self.db, &self.notestore, filter, offset, count)
    }

    pub fn get_note(&mut self, title: &str, notebook: Option<&str>) -> Result<Note> {
        commands::note::get_note(&mut self.db, &self.notestore, &self.config, title, notebook)
    }

    pub fn get_note_with_content(&mut self, title: &str) -> Result<Note> {
        commands::note::get_note_with_content(
            &mut self.db,
            &self.notestore,
            self.codec.as_ref(),
            &self.config,
            title,
        )
    }

    /// Edits a note in the editor. With the bundled codec only `opts.raw`
    /// keeps links, lists and inline formatting intact.
    pub fn edit_note(&mut self, title: &str, opts: NoteOptions) -> Result<EditOutcome> {
        commands::edit::edit_note(
            &mut self.db,
            &self.notestore,
            self.editor.as_ref(),
            self.codec.as_ref(),
            &self.config,
            title,
            opts,
        )
    }

    pub fn create_note_in_editor(&self, title: Option<&str>, raw: bool) -> Result<Note> {
        commands::edit::create_note_in_editor(
            &self.notestore,
            self.editor.as_ref(),
            self.codec.as_ref(),
            title,
            raw,
        )
    }

    pub fn save_new_note(&self, note: &mut Note, raw: bool) -> Result<()> {
        commands::note::save_new_note(&self.notestore, self.codec.as_ref(), note, raw)
    }

    pub fn change_title(&mut self, old: &str, new: &str) -> Result<Note> {
        commands::note::change_title(&mut self.db, &self.notestore, &self.config, old, new)
    }

    pub fn move_note(&mut self, title: &str, notebook: &str) -> Result<Note> {
        commands::note::move_note(&mut self.db, &self.notestore, &self.config, title, notebook)
    }

    pub fn delete_note(&mut self, title: &str, notebook: Option<&str>) -> Result<Note> {
        commands::note::delete_note(&mut self.db, &self.notestore, &self.config, title, notebook)
    }

    pub fn recovery_point(&mut self) -> Result<Option<Note>> {
        self.db.get_recovery_point()
    }

    // --- Credentials and settings ---

    /// Credential type used for new credentials, following the sandbox option.
    pub fn credential_type(&self) -> CredentialType {
        if self.options.sandbox {
            CredentialType::Sandbox
        } else {
            CredentialType::Primary
        }
    }

    pub fn credentials(&self) -> Result<Vec<Credential>> {
        commands::credential::list(&self.db)
    }

    pub fn add_credential(&mut self, name: &str, secret: &str) -> Result<()> {
        let cred_type = self.credential_type();
        commands::credential::add(&mut self.db, name, secret, cred_type)
    }

    pub fn remove_credential_by_name(&mut self, name: &str) -> Result<Credential> {
        commands::credential::remove_by_name(&mut self.db, name)
    }

    /// `indices` are the 1-based positions shown to the user.
    pub fn remove_credentials(&mut self, indices: &[i64]) -> Result<Vec<Credential>> {
        match indices {
            [single] => commands::credential::remove_by_index(&mut self.db, *single).map(|c| vec![c]),
            _ => commands::credential::remove_many(&mut self.db, indices),
        }
    }

    pub fn set_active_credential(&mut self, index: i64) -> Result<Settings> {
        commands::credential::set_active(&mut self.db, index)
    }

    pub fn settings(&mut self) -> Result<Settings> {
        self.db.get_settings()
    }

    pub fn store_settings(&mut self, settings: &Settings) -> Result<()> {
        self.db.store_settings(settings)
    }
}
