//! Credential list persistence.
//!
//! The list is one record (`settings/user_credentials`) kept in append order.
//! Every operation that changes it reads and rewrites the record inside a single
//! write transaction, so an index resolved against the list is always applied
//! to that same list.

use super::backend::{ReadTx, StorageBackend, WriteTx};
use super::{read_record, write_record, Database, CREDENTIALS_KEY, SETTINGS_BUCKET};
use crate::error::{ClinoteError, Result};
use crate::model::{Credential, CredentialType};

fn load<R: ReadTx + ?Sized>(tx: &R) -> Result<Vec<Credential>> {
    Ok(read_record(tx, SETTINGS_BUCKET, CREDENTIALS_KEY)?.unwrap_or_default())
}

fn save(tx: &mut dyn WriteTx, creds: &[Credential]) -> Result<()> {
    write_record(tx, SETTINGS_BUCKET, CREDENTIALS_KEY, creds)
}

/// Validates a zero-based index against a list length.
pub(crate) fn check_index(index: i64, len: usize) -> Result<usize> {
    if index < 0 {
        return Err(ClinoteError::NegativeIndex);
    }
    let index = usize::try_from(index).map_err(|_| ClinoteError::IndexTooBig)?;
    if index >= len {
        return Err(ClinoteError::IndexTooBig);
    }
    Ok(index)
}

impl<B: StorageBackend> Database<B> {
    /// Appends a credential. Names are not required to be unique.
    pub fn add_credential(&mut self, name: &str, secret: &str, cred_type: CredentialType) -> Result<()> {
        let credential = Credential::new(name, secret, cred_type);
        self.backend_mut().update(|tx| {
            let mut creds = load(&*tx)?;
            creds.push(credential);
            save(tx, &creds)
        })
    }

    /// All credentials in append order.
    pub fn credentials(&self) -> Result<Vec<Credential>> {
        self.backend().view(|tx| load(tx))
    }

    /// Zero-based lookup.
    pub fn credential_by_index(&self, index: i64) -> Result<Credential> {
        let creds = self.credentials()?;
        usize::try_from(index)
            .ok()
            .and_then(|i| creds.get(i).cloned())
            .ok_or(ClinoteError::IndexOutOfRange)
    }

    /// Removes the first credential structurally equal to `credential`.
    pub fn remove_credential(&mut self, credential: &Credential) -> Result<()> {
        self.backend_mut().update(|tx| {
            let mut creds = load(&*tx)?;
            let pos = creds
                .iter()
                .position(|c| c == credential)
                .ok_or(ClinoteError::NoMatchingCredentialFound)?;
            creds.remove(pos);
            save(tx, &creds)
        })
    }

    /// Removes the first credential with a matching name.
    pub fn remove_credential_by_name(&mut self, name: &str) -> Result<Credential> {
        self.backend_mut().update(|tx| {
            let mut creds = load(&*tx)?;
            let pos = creds
                .iter()
                .position(|c| c.name == name)
                .ok_or(ClinoteError::NoMatchingCredentialFound)?;
            let removed = creds.remove(pos);
            save(tx, &creds)?;
            Ok(removed)
        })
    }

    /// Removes the credential at a zero-based index.
    pub fn remove_credential_by_index(&mut self, index: i64) -> Result<Credential> {
        self.backend_mut().update(|tx| {
            let mut creds = load(&*tx)?;
            let pos = check_index(index, creds.len())?;
            let target = creds[pos].clone();
            // Remove by equality against the list read in this transaction.
            let pos = creds
                .iter()
                .position(|c| *c == target)
                .ok_or(ClinoteError::NoMatchingCredentialFound)?;
            let removed = creds.remove(pos);
            save(tx, &creds)?;
            Ok(removed)
        })
    }

    /// Removes several zero-based indices at once.
    ///
    /// Indices are sorted and deduplicated, then removed front to back with each
    /// target shifted down by the number of entries already removed. All indices
    /// are validated before anything is removed; one bad index removes nothing.
    pub fn remove_credentials_by_index(&mut self, indices: &[i64]) -> Result<Vec<Credential>> {
        let mut targets = indices.to_vec();
        targets.sort_unstable();
        targets.dedup();

        self.backend_mut().update(|tx| {
            let mut creds = load(&*tx)?;
            let len = creds.len();
            let targets = targets
                .iter()
                .map(|&i| check_index(i, len))
                .collect::<Result<Vec<usize>>>()?;

            let mut removed = Vec::with_capacity(targets.len());
            for target in targets {
                removed.push(creds.remove(target - removed.len()));
            }
            save(tx, &creds)?;
            Ok(removed)
        })
    }
}
