//! # Schema Migrations
//!
//! The schema version is a single unsigned varint under `db_data/dbVersion`
//! (absent means version 0). On open, every step whose version is above the
//! stored one runs in ascending order, and the new version is written in the
//! SAME write transaction. Either all of it lands or none of it does, so a
//! failed migration can simply be retried on the next open.
//!
//! ## Versions
//!
//! - 0: Initial layout, the session token lives in the settings record.
//! - 1: Credential store. The session token is copied into the credential list
//!   as a credential named `OAuth`. The settings record is left as it is: its
//!   `api_key` is still the active session key.

use super::backend::{ReadTx, StorageBackend, WriteTx};
use super::{read_record, write_record};
use super::{CREDENTIALS_KEY, DB_BUCKET, DB_VERSION_KEY, SETTINGS_BUCKET, SETTINGS_KEY};
use crate::error::{ClinoteError, Result};
use crate::model::{Credential, CredentialType, Settings};

pub const SOFTWARE_DB_VERSION: u64 = 1;

/// Name given to the credential synthesized from a legacy session token.
pub const MIGRATED_CREDENTIAL_NAME: &str = "OAuth";

/// Brings the store up to [`SOFTWARE_DB_VERSION`]. Returns the resulting version.
pub fn run<B: StorageBackend>(backend: &mut B) -> Result<u64> {
    let stored = backend.view(|tx| read_version(tx))?;
    if stored >= SOFTWARE_DB_VERSION {
        log::debug!("store schema at version {}", stored);
        return Ok(stored);
    }

    backend.update(|tx| {
        // Re-read under the write lock; another process may have migrated meanwhile.
        let current = read_version(&*tx)?;
        if current >= SOFTWARE_DB_VERSION {
            return Ok(current);
        }
        apply_steps(tx, current)?;
        write_version(tx, SOFTWARE_DB_VERSION)?;
        log::info!(
            "migrated store schema from version {} to {}",
            current,
            SOFTWARE_DB_VERSION
        );
        Ok(SOFTWARE_DB_VERSION)
    })
}

fn apply_steps(tx: &mut dyn WriteTx, from: u64) -> Result<()> {
    if from < 1 {
        migrate_oauth_credential(tx)?;
    }
    Ok(())
}

fn migrate_oauth_credential(tx: &mut dyn WriteTx) -> Result<()> {
    if !tx.bucket_exists(SETTINGS_BUCKET)? {
        log::debug!("no settings stored, nothing to migrate");
        return Ok(());
    }
    let settings: Settings = match read_record(&*tx, SETTINGS_BUCKET, SETTINGS_KEY)? {
        Some(settings) => settings,
        None => return Ok(()),
    };
    if settings.api_key.is_empty() {
        return Ok(());
    }

    let credential = Credential::new(
        MIGRATED_CREDENTIAL_NAME,
        settings.api_key,
        CredentialType::Primary,
    );
    let mut credentials: Vec<Credential> =
        read_record(&*tx, SETTINGS_BUCKET, CREDENTIALS_KEY)?.unwrap_or_default();
    if credentials.contains(&credential) {
        log::debug!("session token already in the credential store");
        return Ok(());
    }
    credentials.push(credential);
    write_record(tx, SETTINGS_BUCKET, CREDENTIALS_KEY, &credentials)?;
    log::info!("moved session token into the credential store");
    Ok(())
}

pub(crate) fn read_version<R: ReadTx + ?Sized>(tx: &R) -> Result<u64> {
    match tx.get(DB_BUCKET, DB_VERSION_KEY)? {
        None => Ok(0),
        Some(data) => decode_uvarint(&data),
    }
}

pub(crate) fn write_version(tx: &mut dyn WriteTx, version: u64) -> Result<()> {
    tx.create_bucket_if_missing(DB_BUCKET)?;
    tx.put(DB_BUCKET, DB_VERSION_KEY, &encode_uvarint(version))
}

/// Little-endian base-128 varint, 7 bits per byte, high bit = continuation.
fn encode_uvarint(mut value: u64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(10);
    while value >= 0x80 {
        buf.push((value as u8) | 0x80);
        value >>= 7;
    }
    buf.push(value as u8);
    buf
}

/// Decodes the leading varint. Bytes after it are ignored; an empty value is 0.
fn decode_uvarint(data: &[u8]) -> Result<u64> {
    if data.is_empty() {
        return Ok(0);
    }
    let mut value: u64 = 0;
    for (i, byte) in data.iter().enumerate() {
        if i == 9 && *byte > 1 {
            break;
        }
        value |= u64::from(byte & 0x7f) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok(value);
        }
        if i == 9 {
            break;
        }
    }
    Err(ClinoteError::CorruptRecord {
        bucket: DB_BUCKET.to_string(),
        key: String::from_utf8_lossy(DB_VERSION_KEY).into_owned(),
        reason: "invalid schema version varint".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mem_backend::MemBackend;

    fn legacy_store(api_key: &str) -> MemBackend {
        let mut backend = MemBackend::new();
        let legacy = format!(r#"{{"APIKey":"{}"}}"#, api_key);
        backend.insert_raw(SETTINGS_BUCKET, SETTINGS_KEY, legacy.as_bytes());
        backend
    }

    fn credentials(backend: &MemBackend) -> Vec<Credential> {
        backend
            .view(|tx| read_record(tx, SETTINGS_BUCKET, CREDENTIALS_KEY))
            .unwrap()
            .unwrap_or_default()
    }

    fn reset_version(backend: &mut MemBackend) {
        backend.update(|tx| write_version(tx, 0)).unwrap();
    }

    #[test]
    fn test_varint_values() {
        assert_eq!(encode_uvarint(0), vec![0]);
        assert_eq!(encode_uvarint(1), vec![1]);
        assert_eq!(encode_uvarint(300), vec![0xac, 0x02]);
        assert_eq!(decode_uvarint(&[0xac, 0x02]).unwrap(), 300);
        assert_eq!(decode_uvarint(&encode_uvarint(u64::MAX)).unwrap(), u64::MAX);
    }

    #[test]
    fn test_varint_ignores_padding() {
        // Older writers stored the version in a zero-padded 8-byte buffer.
        assert_eq!(decode_uvarint(&[1, 0, 0, 0, 0, 0, 0, 0]).unwrap(), 1);
    }

    #[test]
    fn test_varint_rejects_truncated_value() {
        assert!(decode_uvarint(&[0x80, 0x80]).is_err());
    }

    #[test]
    fn test_empty_store_gets_current_version() {
        let mut backend = MemBackend::new();
        assert_eq!(run(&mut backend).unwrap(), SOFTWARE_DB_VERSION);
        assert_eq!(backend.view(|tx| read_version(tx)).unwrap(), SOFTWARE_DB_VERSION);
        assert!(credentials(&backend).is_empty());
    }

    #[test]
    fn test_legacy_token_becomes_credential() {
        let mut backend = legacy_store("legacy-token");
        run(&mut backend).unwrap();

        let creds = credentials(&backend);
        assert_eq!(
            creds,
            vec![Credential::new("OAuth", "legacy-token", CredentialType::Primary)]
        );

        // Settings are left in place.
        let settings: Settings = backend
            .view(|tx| read_record(tx, SETTINGS_BUCKET, SETTINGS_KEY))
            .unwrap()
            .unwrap();
        assert_eq!(settings.api_key, "legacy-token");
    }

    #[test]
    fn test_migration_is_idempotent() {
        let mut backend = legacy_store("legacy-token");
        run(&mut backend).unwrap();
        reset_version(&mut backend);
        run(&mut backend).unwrap();

        assert_eq!(credentials(&backend).len(), 1);
    }

    #[test]
    fn test_up_to_date_store_is_untouched() {
        let mut backend = legacy_store("legacy-token");
        backend
            .update(|tx| write_version(tx, SOFTWARE_DB_VERSION))
            .unwrap();
        run(&mut backend).unwrap();
        assert!(credentials(&backend).is_empty());
    }

    #[test]
    fn test_empty_token_is_not_migrated() {
        let mut backend = legacy_store("");
        run(&mut backend).unwrap();
        assert!(credentials(&backend).is_empty());
    }

    #[test]
    fn test_corrupt_settings_abort_without_advancing_version() {
        let mut backend = MemBackend::new();
        backend.insert_raw(SETTINGS_BUCKET, SETTINGS_KEY, b"{broken");

        assert!(run(&mut backend).is_err());
        assert_eq!(backend.view(|tx| read_version(tx)).unwrap(), 0);
        assert!(credentials(&backend).is_empty());
    }

    #[test]
    fn test_failed_write_leaves_version_unchanged() {
        let mut backend = legacy_store("legacy-token");
        backend.set_simulate_write_error(true);
        assert!(run(&mut backend).is_err());

        backend.set_simulate_write_error(false);
        assert_eq!(backend.view(|tx| read_version(tx)).unwrap(), 0);
        assert!(credentials(&backend).is_empty());

        // Retry succeeds.
        run(&mut backend).unwrap();
        assert_eq!(credentials(&backend).len(), 1);
    }
}
