mod common;

use clinoteapp::api::Client;
use clinoteapp::commands::edit::EditOutcome;
use clinoteapp::config::{ClientOptions, ClinoteConfig, NoteOptions};
use clinoteapp::error::ClinoteError;
use clinoteapp::markup::PlainTextCodec;
use clinoteapp::model::NoteFilter;
use clinoteapp::store::sqlite_backend::SqliteBackend;
use clinoteapp::store::Database;
use common::{FixedEditor, RemoteStub};
use tempfile::TempDir;

fn client(dir: &TempDir, remote: RemoteStub, reply: Option<&str>) -> Client<SqliteBackend, RemoteStub> {
    let config = ClinoteConfig::default();
    let db = Database::open(dir.path(), &config).unwrap();
    Client::new(
        config,
        ClientOptions::default(),
        db,
        remote,
        Box::new(FixedEditor(reply.map(str::to_string))),
        Box::new(PlainTextCodec),
    )
}

fn remote_with_foo() -> RemoteStub {
    let mut remote = RemoteStub::with_notebooks(&["Work", "Home"]);
    remote.add_note("Foo", "n-1", "<div>bar</div>");
    remote.add_note("Other", "n-2", "<div>x</div>");
    remote.add_note("Third", "n-3", "<div>y</div>");
    remote
}

#[test]
fn failed_save_leaves_recovery_point_on_disk() {
    let dir = TempDir::new().unwrap();
    let remote = remote_with_foo();
    remote.fail_updates.set(true);

    let mut c = client(&dir, remote, Some("Foo\n\nbaz"));
    let err = c.edit_note("Foo", NoteOptions::default()).unwrap_err();
    assert!(matches!(err, ClinoteError::Remote(_)));
    assert_eq!(c.notestore().updates.borrow().len(), 1);
    c.close().unwrap();

    // A later run recovers the edit and pushes it.
    let mut c = client(&dir, remote_with_foo(), None);
    let recovered = c.recovery_point().unwrap().unwrap();
    assert_eq!(recovered.title, "Foo");
    assert_eq!(recovered.md, "baz");

    let opts = NoteOptions {
        recover: true,
        ..Default::default()
    };
    let outcome = c.edit_note("ignored", opts).unwrap();
    let EditOutcome::Saved(saved) = outcome else {
        panic!("recovered note was not saved");
    };
    assert_eq!(saved.guid, "n-1");
    assert!(c.notestore().updates.borrow()[0].body.contains("baz"));
    assert_eq!(c.recovery_point().unwrap(), None);
    c.close().unwrap();
}

#[test]
fn unchanged_edit_sends_nothing() {
    let dir = TempDir::new().unwrap();
    let mut c = client(&dir, remote_with_foo(), None);

    let outcome = c.edit_note("Foo", NoteOptions::default()).unwrap();
    assert_eq!(outcome, EditOutcome::Unchanged);
    assert!(c.notestore().updates.borrow().is_empty());
    assert_eq!(c.recovery_point().unwrap(), None);
    c.close().unwrap();
}

#[test]
fn force_sync_replaces_cached_notebooks() {
    let dir = TempDir::new().unwrap();
    let mut c = client(&dir, RemoteStub::with_notebooks(&["A", "B"]), None);
    assert_eq!(c.get_notebooks(false).unwrap().len(), 2);
    c.close().unwrap();

    // Another device added a notebook; the fresh cache hides it until a sync.
    let mut c = client(&dir, RemoteStub::with_notebooks(&["A", "B", "C"]), None);
    assert_eq!(c.get_notebooks(false).unwrap().len(), 2);
    assert_eq!(c.notestore().notebook_calls.get(), 0);

    assert_eq!(c.get_notebooks(true).unwrap().len(), 3);
    assert_eq!(c.notestore().notebook_calls.get(), 1);
    assert_eq!(c.get_notebooks(false).unwrap().len(), 3);
    assert_eq!(c.notestore().notebook_calls.get(), 1);
    c.close().unwrap();
}

#[test]
fn saved_search_addresses_notes_across_runs() {
    let dir = TempDir::new().unwrap();
    let mut c = client(&dir, remote_with_foo(), None);
    let found = c.find_notes(&NoteFilter::default(), 0, 20).unwrap();
    assert_eq!(found.len(), 3);
    c.close().unwrap();

    let mut c = client(&dir, remote_with_foo(), None);
    assert_eq!(c.get_note("3", None).unwrap().title, "Third");
    let err = c.get_note("4", None).unwrap_err();
    assert!(err.is_not_found());
    assert!(matches!(err, ClinoteError::NoNoteFound));
    c.close().unwrap();
}

#[test]
fn active_credential_is_persisted() {
    let dir = TempDir::new().unwrap();
    let mut c = client(&dir, RemoteStub::default(), None);
    c.add_credential("work", "work-key").unwrap();
    c.add_credential("home", "home-key").unwrap();
    c.set_active_credential(2).unwrap();
    c.close().unwrap();

    let mut c = client(&dir, RemoteStub::default(), None);
    let settings = c.settings().unwrap();
    assert_eq!(settings.api_key, "home-key");
    assert_eq!(settings.credential.map(|cred| cred.name), Some("home".to_string()));
    c.close().unwrap();
}
