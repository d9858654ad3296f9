//! Credential commands.
//!
//! Users see credentials as a numbered list starting at 1. These functions take
//! those user indices and translate them for the store, which counts from 0.

use crate::error::{ClinoteError, Result};
use crate::model::{Credential, CredentialType, Settings};
use crate::store::backend::StorageBackend;
use crate::store::Database;

fn to_store_index(user_index: i64) -> Result<i64> {
    user_index.checked_sub(1).ok_or(ClinoteError::NegativeIndex)
}

pub fn list<B: StorageBackend>(db: &Database<B>) -> Result<Vec<Credential>> {
    db.credentials()
}

pub fn add<B: StorageBackend>(
    db: &mut Database<B>,
    name: &str,
    secret: &str,
    cred_type: CredentialType,
) -> Result<()> {
    db.add_credential(name, secret, cred_type)?;
    log::info!("added {} credential '{}'", cred_type, name);
    Ok(())
}

pub fn remove_by_name<B: StorageBackend>(db: &mut Database<B>, name: &str) -> Result<Credential> {
    db.remove_credential_by_name(name)
}

pub fn remove_by_index<B: StorageBackend>(db: &mut Database<B>, user_index: i64) -> Result<Credential> {
    db.remove_credential_by_index(to_store_index(user_index)?)
}

/// Removes several credentials at once. Duplicates are ignored; one invalid
/// index removes nothing.
pub fn remove_many<B: StorageBackend>(
    db: &mut Database<B>,
    user_indices: &[i64],
) -> Result<Vec<Credential>> {
    let indices = user_indices
        .iter()
        .map(|&i| to_store_index(i))
        .collect::<Result<Vec<_>>>()?;
    let removed = db.remove_credentials_by_index(&indices)?;
    log::info!("removed {} credentials", removed.len());
    Ok(removed)
}

/// Makes the credential at `user_index` the active session.
pub fn set_active<B: StorageBackend>(db: &mut Database<B>, user_index: i64) -> Result<Settings> {
    let credential = db.credential_by_index(to_store_index(user_index)?)?;
    let mut settings = db.get_settings()?;
    settings.api_key = credential.secret.clone();
    settings.credential = Some(credential);
    db.store_settings(&settings)?;
    Ok(settings)
}
