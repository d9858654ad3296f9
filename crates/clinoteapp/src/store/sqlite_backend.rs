use super::backend::{ReadTx, StorageBackend, WriteTx};
use crate::error::{ClinoteError, Result};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Transaction, TransactionBehavior};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Single-file SQLite storage backend.
///
/// Buckets are rows in `buckets`; values live in `entries` keyed by
/// `(bucket, key)`. Writers take an IMMEDIATE transaction, so only one writer
/// holds the file at a time. A lock held by another process is waited on for
/// at most `lock_timeout` and then reported as [`ClinoteError::StoreLocked`].
pub struct SqliteBackend {
    conn: Connection,
    path: PathBuf,
}

impl SqliteBackend {
    pub fn open<P: AsRef<Path>>(path: P, lock_timeout: Duration) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open(&path).map_err(sqlite_err)?;
        conn.busy_timeout(lock_timeout).map_err(sqlite_err)?;
        conn.execute_batch(include_str!("schema.sql"))
            .map_err(sqlite_err)?;
        log::debug!("opened store at {}", path.display());
        Ok(Self { conn, path })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(sqlite_err)?;
        conn.execute_batch(include_str!("schema.sql"))
            .map_err(sqlite_err)?;
        Ok(Self {
            conn,
            path: PathBuf::from(":memory:"),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Lock contention becomes `StoreLocked`; everything else stays a database error.
fn sqlite_err(err: rusqlite::Error) -> ClinoteError {
    match err.sqlite_error_code() {
        Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked) => {
            ClinoteError::StoreLocked(err.to_string())
        }
        _ => ClinoteError::Database(err),
    }
}

impl ReadTx for Transaction<'_> {
    fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        let count: i64 = self
            .query_row(
                "SELECT COUNT(*) FROM buckets WHERE name = ?1",
                params![bucket],
                |row| row.get(0),
            )
            .map_err(sqlite_err)?;
        Ok(count > 0)
    }

    fn get(&self, bucket: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.query_row(
            "SELECT value FROM entries WHERE bucket = ?1 AND key = ?2",
            params![bucket, key],
            |row| row.get::<_, Vec<u8>>(0),
        )
        .optional()
        .map_err(sqlite_err)
    }
}

impl WriteTx for Transaction<'_> {
    fn create_bucket_if_missing(&mut self, bucket: &str) -> Result<()> {
        self.execute(
            "INSERT OR IGNORE INTO buckets (name) VALUES (?1)",
            params![bucket],
        )
        .map_err(sqlite_err)?;
        Ok(())
    }

    fn put(&mut self, bucket: &str, key: &[u8], value: &[u8]) -> Result<()> {
        if !self.bucket_exists(bucket)? {
            return Err(ClinoteError::Store(format!("no bucket: {}", bucket)));
        }
        self.execute(
            "INSERT OR REPLACE INTO entries (bucket, key, value) VALUES (?1, ?2, ?3)",
            params![bucket, key, value],
        )
        .map_err(sqlite_err)?;
        Ok(())
    }

    fn delete(&mut self, bucket: &str, key: &[u8]) -> Result<()> {
        self.execute(
            "DELETE FROM entries WHERE bucket = ?1 AND key = ?2",
            params![bucket, key],
        )
        .map_err(sqlite_err)?;
        Ok(())
    }
}

impl StorageBackend for SqliteBackend {
    fn view<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&dyn ReadTx) -> Result<T>,
    {
        // Deferred transaction: a consistent snapshot, dropped (rolled back) afterwards.
        let tx = self.conn.unchecked_transaction().map_err(sqlite_err)?;
        f(&tx)
    }

    fn update<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn WriteTx) -> Result<T>,
    {
        let mut tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(sqlite_err)?;
        let out = f(&mut tx)?;
        tx.commit().map_err(sqlite_err)?;
        Ok(out)
    }

    fn close(self) -> Result<()> {
        let path = self.path;
        self.conn.close().map_err(|(_, e)| sqlite_err(e))?;
        log::debug!("closed store at {}", path.display());
        Ok(())
    }
}
