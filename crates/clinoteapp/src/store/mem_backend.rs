use super::backend::{ReadTx, StorageBackend, WriteTx};
use crate::error::{ClinoteError, Result};
use std::collections::BTreeMap;

type Buckets = BTreeMap<String, BTreeMap<Vec<u8>, Vec<u8>>>;

/// In-memory storage backend for testing.
///
/// Write transactions work on a copy of the data that replaces the original
/// only when the closure succeeds, matching the commit/rollback behaviour of
/// the SQLite backend.
#[derive(Default)]
pub struct MemBackend {
    buckets: Buckets,
    simulate_write_error: bool,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&mut self, simulate: bool) {
        self.simulate_write_error = simulate;
    }

    /// Test helper to plant a raw value, bypassing record encoding.
    pub fn insert_raw(&mut self, bucket: &str, key: &[u8], value: &[u8]) {
        self.buckets
            .entry(bucket.to_string())
            .or_default()
            .insert(key.to_vec(), value.to_vec());
    }
}

struct MemTx<'a> {
    buckets: &'a mut Buckets,
    fail_writes: bool,
}

impl MemTx<'_> {
    fn check_writable(&self) -> Result<()> {
        if self.fail_writes {
            return Err(ClinoteError::Store("Simulated write error".to_string()));
        }
        Ok(())
    }
}

fn read(buckets: &Buckets, bucket: &str, key: &[u8]) -> Option<Vec<u8>> {
    buckets.get(bucket).and_then(|b| b.get(key)).cloned()
}

impl ReadTx for Buckets {
    fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        Ok(self.contains_key(bucket))
    }

    fn get(&self, bucket: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(read(self, bucket, key))
    }
}

impl ReadTx for MemTx<'_> {
    fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        Ok(self.buckets.contains_key(bucket))
    }

    fn get(&self, bucket: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(read(self.buckets, bucket, key))
    }
}

impl WriteTx for MemTx<'_> {
    fn create_bucket_if_missing(&mut self, bucket: &str) -> Result<()> {
        self.check_writable()?;
        self.buckets.entry(bucket.to_string()).or_default();
        Ok(())
    }

    fn put(&mut self, bucket: &str, key: &[u8], value: &[u8]) -> Result<()> {
        self.check_writable()?;
        let entries = self
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| ClinoteError::Store(format!("no bucket: {}", bucket)))?;
        entries.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&mut self, bucket: &str, key: &[u8]) -> Result<()> {
        self.check_writable()?;
        if let Some(entries) = self.buckets.get_mut(bucket) {
            entries.remove(key);
        }
        Ok(())
    }
}

impl StorageBackend for MemBackend {
    fn view<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&dyn ReadTx) -> Result<T>,
    {
        f(&self.buckets)
    }

    fn update<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn WriteTx) -> Result<T>,
    {
        let mut working = self.buckets.clone();
        let out = f(&mut MemTx {
            buckets: &mut working,
            fail_writes: self.simulate_write_error,
        })?;
        self.buckets = working;
        Ok(out)
    }

    fn close(self) -> Result<()> {
        Ok(())
    }
}
