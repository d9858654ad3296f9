//! # Storage Layer
//!
//! Everything the client keeps between invocations lives in one embedded,
//! transactional key-value file organised in named buckets:
//!
//! | Bucket     | Key                  | Value                                   |
//! |------------|----------------------|-----------------------------------------|
//! | `db_data`  | `dbVersion`          | schema version, unsigned LEB128 varint  |
//! | `settings` | `user_settings`      | [`Settings`] (JSON)                     |
//! | `settings` | `user_credentials`   | ordered list of [`Credential`] (JSON)   |
//! | `cache`    | `notebook_cache`     | [`NotebookCacheList`] (JSON)            |
//! | `cache`    | `note_search_cache`  | ordered list of [`Note`] (JSON)         |
//! | `cache`    | `note_recover_cache` | single [`Note`] (JSON)                  |
//!
//! ## Transactions
//!
//! Each public operation runs in one transaction scoped to that operation.
//! Read-modify-write operations (appending or removing a credential, the schema
//! migration) run their read and their write inside the same write transaction.
//!
//! ## Missing Buckets
//!
//! Reading from a bucket that was never created is not an error: the bucket is
//! created and the read reports "nothing stored". A record that is present but
//! cannot be decoded IS an error ([`ClinoteError::CorruptRecord`]); a corrupt
//! cache is never mistaken for an empty one.
//!
//! ## Lifetime
//!
//! A [`Database`] is opened once per process and closed with [`Database::close`],
//! which flushes and unlocks the file and reports any failure. Dropping the
//! handle on an error path also releases the file.
//!
//! ## Implementations
//!
//! - [`sqlite_backend::SqliteBackend`]: production, a single SQLite file.
//! - [`mem_backend::MemBackend`]: for testing logic without filesystem I/O.

use crate::config::ClinoteConfig;
use crate::error::{ClinoteError, Result};
use crate::model::{Note, NotebookCacheList, Settings};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

pub mod backend;
pub mod credentials;
pub mod mem_backend;
pub mod migrate;
pub mod sqlite_backend;

use backend::{ReadTx, StorageBackend, WriteTx};
use sqlite_backend::SqliteBackend;

pub(crate) const DB_BUCKET: &str = "db_data";
pub(crate) const SETTINGS_BUCKET: &str = "settings";
pub(crate) const CACHE_BUCKET: &str = "cache";

pub(crate) const DB_VERSION_KEY: &[u8] = b"dbVersion";
pub(crate) const SETTINGS_KEY: &[u8] = b"user_settings";
pub(crate) const CREDENTIALS_KEY: &[u8] = b"user_credentials";
pub(crate) const NOTEBOOK_CACHE_KEY: &[u8] = b"notebook_cache";
pub(crate) const SEARCH_CACHE_KEY: &[u8] = b"note_search_cache";
pub(crate) const NOTE_RECOVER_KEY: &[u8] = b"note_recover_cache";

/// Decodes a stored JSON record. `Ok(None)` means nothing was stored.
pub(crate) fn read_record<T: DeserializeOwned, R: ReadTx + ?Sized>(
    tx: &R,
    bucket: &str,
    key: &[u8],
) -> Result<Option<T>> {
    match tx.get(bucket, key)? {
        None => Ok(None),
        Some(data) => serde_json::from_slice(&data)
            .map(Some)
            .map_err(|e| ClinoteError::CorruptRecord {
                bucket: bucket.to_string(),
                key: String::from_utf8_lossy(key).into_owned(),
                reason: e.to_string(),
            }),
    }
}

/// Encodes and stores a JSON record, creating the bucket when needed.
pub(crate) fn write_record<T: Serialize + ?Sized>(
    tx: &mut dyn WriteTx,
    bucket: &str,
    key: &[u8],
    value: &T,
) -> Result<()> {
    let data = serde_json::to_vec(value)?;
    tx.create_bucket_if_missing(bucket)?;
    tx.put(bucket, key, &data)
}

/// Typed access to the persisted records.
pub struct Database<B: StorageBackend> {
    backend: B,
}

impl Database<SqliteBackend> {
    /// Opens (creating if needed) the store file inside `folder` and brings its
    /// schema up to date. A failed migration aborts the open.
    pub fn open(folder: &Path, config: &ClinoteConfig) -> Result<Self> {
        std::fs::create_dir_all(folder)?;
        let backend = SqliteBackend::open(folder.join(&config.db_file_name), config.lock_timeout())?;
        Self::with_backend(backend)
    }
}

impl<B: StorageBackend> Database<B> {
    /// Wraps an already opened backend and runs pending migrations.
    pub fn with_backend(mut backend: B) -> Result<Self> {
        migrate::run(&mut backend)?;
        Ok(Self { backend })
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Flushes and releases the store.
    pub fn close(self) -> Result<()> {
        self.backend.close()
    }

    pub fn schema_version(&self) -> Result<u64> {
        self.backend.view(|tx| migrate::read_version(tx))
    }

    fn get_record<T: DeserializeOwned>(&mut self, bucket: &str, key: &[u8]) -> Result<Option<T>> {
        let (exists, record) = self.backend.view(|tx| {
            if !tx.bucket_exists(bucket)? {
                return Ok((false, None));
            }
            Ok((true, read_record(tx, bucket, key)?))
        })?;
        if !exists {
            self.backend
                .update(|tx| tx.create_bucket_if_missing(bucket))?;
        }
        Ok(record)
    }

    fn store_record<T: Serialize + ?Sized>(&mut self, bucket: &str, key: &[u8], value: &T) -> Result<()> {
        self.backend
            .update(|tx| write_record(tx, bucket, key, value))
    }

    // --- Settings ---

    /// Returns the stored settings, or the zero value if none were stored yet.
    pub fn get_settings(&mut self) -> Result<Settings> {
        Ok(self
            .get_record(SETTINGS_BUCKET, SETTINGS_KEY)?
            .unwrap_or_default())
    }

    pub fn store_settings(&mut self, settings: &Settings) -> Result<()> {
        self.store_record(SETTINGS_BUCKET, SETTINGS_KEY, settings)
    }

    // --- Notebook cache ---

    pub fn get_notebook_cache(&mut self) -> Result<Option<NotebookCacheList>> {
        self.get_record(CACHE_BUCKET, NOTEBOOK_CACHE_KEY)
    }

    /// Replaces the stored notebook list wholesale.
    pub fn store_notebook_list(&mut self, list: &NotebookCacheList) -> Result<()> {
        self.store_record(CACHE_BUCKET, NOTEBOOK_CACHE_KEY, list)
    }

    // --- Saved search ---

    pub fn save_search(&mut self, notes: &[Note]) -> Result<()> {
        self.store_record(CACHE_BUCKET, SEARCH_CACHE_KEY, notes)
    }

    pub fn get_search(&mut self) -> Result<Vec<Note>> {
        Ok(self
            .get_record(CACHE_BUCKET, SEARCH_CACHE_KEY)?
            .unwrap_or_default())
    }

    // --- Recovery point ---

    /// Overwrites the single recovery slot.
    pub fn save_recovery_point(&mut self, note: &Note) -> Result<()> {
        self.store_record(CACHE_BUCKET, NOTE_RECOVER_KEY, note)
    }

    /// Returns `None` when no recovery point exists.
    pub fn get_recovery_point(&mut self) -> Result<Option<Note>> {
        self.get_record(CACHE_BUCKET, NOTE_RECOVER_KEY)
    }

    pub fn clear_recovery_point(&mut self) -> Result<()> {
        self.backend.update(|tx| {
            tx.create_bucket_if_missing(CACHE_BUCKET)?;
            tx.delete(CACHE_BUCKET, NOTE_RECOVER_KEY)
        })
    }
}
