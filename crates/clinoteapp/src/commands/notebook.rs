//! Notebook listing through the local cache.
//!
//! The notebook list is served from the cache while it is fresh and non-empty.
//! A forced sync, an outdated list, an empty list or a missing cache record all
//! go to the remote store, and the fresh list replaces the cached one.

use crate::config::ClinoteConfig;
use crate::error::{ClinoteError, Result};
use crate::model::{Notebook, NotebookCacheList};
use crate::notestore::NoteStoreClient;
use crate::store::backend::StorageBackend;
use crate::store::Database;

/// Fields to change on a notebook. `None` and empty strings leave the field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotebookPatch {
    pub name: Option<String>,
    pub stack: Option<String>,
}

impl NotebookPatch {
    fn apply(&self, notebook: &mut Notebook) {
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            notebook.name = name.to_string();
        }
        if let Some(stack) = self.stack.as_deref().filter(|s| !s.is_empty()) {
            notebook.stack = stack.to_string();
        }
    }
}

pub fn get_notebooks<B: StorageBackend, N: NoteStoreClient>(
    db: &mut Database<B>,
    ns: &N,
    config: &ClinoteConfig,
    force_sync: bool,
) -> Result<Vec<Notebook>> {
    let cached = db
        .get_notebook_cache()?
        .unwrap_or_else(NotebookCacheList::empty);

    if !force_sync && !cached.is_outdated() && !cached.notebooks.is_empty() {
        log::debug!("using {} cached notebooks", cached.notebooks.len());
        return Ok(cached.notebooks);
    }

    log::debug!(
        "refreshing notebook cache (forced: {}, cached: {})",
        force_sync,
        cached.notebooks.len()
    );
    let notebooks = ns.get_all_notebooks()?;
    let list = NotebookCacheList::with_limit(notebooks, config.notebook_cache_limit());
    db.store_notebook_list(&list)?;
    Ok(list.notebooks)
}

/// First notebook whose name matches exactly.
pub fn find_notebook<B: StorageBackend, N: NoteStoreClient>(
    db: &mut Database<B>,
    ns: &N,
    config: &ClinoteConfig,
    name: &str,
) -> Result<Notebook> {
    get_notebooks(db, ns, config, false)?
        .into_iter()
        .find(|nb| nb.name == name)
        .ok_or(ClinoteError::NoNotebookFound)
}

/// Applies `patch` to the notebook named `name` and pushes it to the remote
/// store. The cached entry is patched too; its timestamp is kept.
pub fn update_notebook<B: StorageBackend, N: NoteStoreClient>(
    db: &mut Database<B>,
    ns: &N,
    config: &ClinoteConfig,
    name: &str,
    patch: &NotebookPatch,
) -> Result<Notebook> {
    let mut notebook = find_notebook(db, ns, config, name)?;
    patch.apply(&mut notebook);
    ns.update_notebook(&notebook)?;

    if let Some(mut cached) = db.get_notebook_cache()? {
        if let Some(entry) = cached
            .notebooks
            .iter_mut()
            .find(|nb| nb.guid == notebook.guid && nb.name == name)
        {
            *entry = notebook.clone();
            db.store_notebook_list(&cached)?;
        }
    }
    Ok(notebook)
}

pub fn get_notebook<N: NoteStoreClient>(ns: &N, guid: &str) -> Result<Notebook> {
    ns.get_notebook(guid)
}

pub fn create_notebook<N: NoteStoreClient>(ns: &N, notebook: &Notebook, default: bool) -> Result<()> {
    ns.create_notebook(notebook, default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{mem_db, notebook, MockNoteStore};
    use chrono::{Duration as ChronoDuration, Utc};
    use std::time::Duration;

    fn remote() -> MockNoteStore {
        MockNoteStore::new().with_notebooks(vec![
            notebook("Work", "nb-1"),
            notebook("Home", "nb-2"),
            notebook("Travel", "nb-3"),
        ])
    }

    fn cache(db: &mut Database<crate::store::mem_backend::MemBackend>, names: &[&str]) {
        let books = names.iter().map(|n| Notebook::new(*n)).collect();
        db.store_notebook_list(&NotebookCacheList::new(books)).unwrap();
    }

    #[test]
    fn fresh_cache_skips_remote() {
        let mut db = mem_db();
        let ns = remote();
        cache(&mut db, &["A", "B"]);

        let books = get_notebooks(&mut db, &ns, &ClinoteConfig::default(), false).unwrap();
        assert_eq!(books.len(), 2);
        assert_eq!(ns.notebook_list_calls.get(), 0);
    }

    #[test]
    fn force_sync_refreshes_and_persists() {
        let mut db = mem_db();
        let ns = remote();
        cache(&mut db, &["A", "B"]);
        let before = Utc::now();

        let books = get_notebooks(&mut db, &ns, &ClinoteConfig::default(), true).unwrap();
        assert_eq!(books.len(), 3);
        assert_eq!(ns.notebook_list_calls.get(), 1);

        let stored = db.get_notebook_cache().unwrap().unwrap();
        assert_eq!(stored.notebooks.len(), 3);
        assert!(stored.timestamp >= before);
    }

    #[test]
    fn missing_cache_goes_remote() {
        let mut db = mem_db();
        let ns = remote();

        let books = get_notebooks(&mut db, &ns, &ClinoteConfig::default(), false).unwrap();
        assert_eq!(books.len(), 3);
        assert_eq!(ns.notebook_list_calls.get(), 1);
        assert!(db.get_notebook_cache().unwrap().is_some());
    }

    #[test]
    fn empty_cache_goes_remote() {
        let mut db = mem_db();
        let ns = remote();
        cache(&mut db, &[]);

        get_notebooks(&mut db, &ns, &ClinoteConfig::default(), false).unwrap();
        assert_eq!(ns.notebook_list_calls.get(), 1);
    }

    #[test]
    fn outdated_cache_goes_remote() {
        let mut db = mem_db();
        let ns = remote();
        let old = NotebookCacheList::created_at(
            vec![Notebook::new("A")],
            Utc::now() - ChronoDuration::hours(2),
            Duration::from_secs(60 * 60),
        );
        db.store_notebook_list(&old).unwrap();

        let books = get_notebooks(&mut db, &ns, &ClinoteConfig::default(), false).unwrap();
        assert_eq!(books.len(), 3);
        assert_eq!(ns.notebook_list_calls.get(), 1);
    }

    #[test]
    fn refreshed_list_uses_configured_limit() {
        let mut db = mem_db();
        let ns = remote();
        let config = ClinoteConfig {
            notebook_cache_hours: 1,
            ..Default::default()
        };

        get_notebooks(&mut db, &ns, &config, true).unwrap();
        let stored = db.get_notebook_cache().unwrap().unwrap();
        assert_eq!(stored.limit, Duration::from_secs(60 * 60));
    }

    #[test]
    fn find_notebook_by_exact_name() {
        let mut db = mem_db();
        let ns = remote();
        let config = ClinoteConfig::default();

        let found = find_notebook(&mut db, &ns, &config, "Home").unwrap();
        assert_eq!(found.guid, "nb-2");
        assert!(matches!(
            find_notebook(&mut db, &ns, &config, "home"),
            Err(ClinoteError::NoNotebookFound)
        ));
    }

    #[test]
    fn update_notebook_only_applies_non_empty_fields() {
        let mut db = mem_db();
        let ns = remote();
        let patch = NotebookPatch {
            name: Some(String::new()),
            stack: Some("Archive".to_string()),
        };

        let updated =
            update_notebook(&mut db, &ns, &ClinoteConfig::default(), "Work", &patch).unwrap();
        assert_eq!(updated.name, "Work");
        assert_eq!(updated.stack, "Archive");
        assert_eq!(ns.updated_notebooks.borrow().as_slice(), &[updated]);
    }

    #[test]
    fn renamed_notebook_is_found_from_cache() {
        let mut db = mem_db();
        let ns = remote();
        let config = ClinoteConfig::default();
        let patch = NotebookPatch {
            name: Some("Office".to_string()),
            stack: None,
        };

        update_notebook(&mut db, &ns, &config, "Work", &patch).unwrap();
        let before = db.get_notebook_cache().unwrap().unwrap().timestamp;

        assert_eq!(find_notebook(&mut db, &ns, &config, "Office").unwrap().guid, "nb-1");
        assert!(matches!(
            find_notebook(&mut db, &ns, &config, "Work"),
            Err(ClinoteError::NoNotebookFound)
        ));
        assert_eq!(ns.notebook_list_calls.get(), 1);
        assert_eq!(db.get_notebook_cache().unwrap().unwrap().timestamp, before);
    }

    #[test]
    fn failed_remote_update_leaves_cache_alone() {
        let mut db = mem_db();
        let ns = remote();
        ns.set_fail_notebook_update(true);
        let patch = NotebookPatch {
            name: Some("Office".to_string()),
            stack: None,
        };

        assert!(update_notebook(&mut db, &ns, &ClinoteConfig::default(), "Work", &patch).is_err());
        let names: Vec<String> = db
            .get_notebook_cache()
            .unwrap()
            .unwrap()
            .notebooks
            .into_iter()
            .map(|nb| nb.name)
            .collect();
        assert_eq!(names, vec!["Work", "Home", "Travel"]);
    }

    #[test]
    fn update_unknown_notebook_fails_without_remote_write() {
        let mut db = mem_db();
        let ns = remote();
        let result = update_notebook(
            &mut db,
            &ns,
            &ClinoteConfig::default(),
            "Nope",
            &NotebookPatch::default(),
        );
        assert!(matches!(result, Err(ClinoteError::NoNotebookFound)));
        assert!(ns.updated_notebooks.borrow().is_empty());
    }

    #[test]
    fn create_and_get_go_to_the_remote_store() {
        let ns = remote();
        create_notebook(&ns, &Notebook::new("New"), true).unwrap();
        assert_eq!(ns.created_notebooks.borrow()[0], (Notebook::new("New"), true));
        assert_eq!(get_notebook(&ns, "nb-3").unwrap().name, "Travel");
    }
}
