use crate::error::Result;

/// Read access inside a transaction.
pub trait ReadTx {
    fn bucket_exists(&self, bucket: &str) -> Result<bool>;

    /// Returns `Ok(None)` when the key, or the whole bucket, is absent.
    fn get(&self, bucket: &str, key: &[u8]) -> Result<Option<Vec<u8>>>;
}

/// Write access inside a transaction.
pub trait WriteTx: ReadTx {
    fn create_bucket_if_missing(&mut self, bucket: &str) -> Result<()>;

    /// Fails with a store error if the bucket does not exist.
    fn put(&mut self, bucket: &str, key: &[u8], value: &[u8]) -> Result<()>;

    fn delete(&mut self, bucket: &str, key: &[u8]) -> Result<()>;
}

/// Abstract interface for the embedded key-value engine.
///
/// This trait handles the "how" of persistence (SQLite file vs memory),
/// while [`super::Database`] handles the "what" (records, caches, migrations).
///
/// Every closure runs inside exactly one transaction. A write transaction commits
/// only if the closure returns `Ok`; any error rolls it back, so no caller ever
/// observes a half-applied update.
pub trait StorageBackend {
    fn view<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&dyn ReadTx) -> Result<T>;

    fn update<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn WriteTx) -> Result<T>;

    /// Flushes and releases the underlying resource.
    fn close(self) -> Result<()>
    where
        Self: Sized;
}
