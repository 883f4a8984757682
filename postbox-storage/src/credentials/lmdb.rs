//! LMDB-backed credential store.
//!
//! Uses the heed crate (Rust bindings for LMDB) to persist identity records
//! in a single unnamed database keyed by the identity string. Values are the
//! JSON encoding of [`IdentityRecord`].
//!
//! # Thread Safety
//!
//! LMDB allows one write transaction at a time. `insert` reads and writes
//! inside the same write transaction, which makes the duplicate check atomic
//! across threads sharing the environment.

use std::path::Path;

use async_trait::async_trait;
use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};
use postbox_core::{Identity, IdentityRecord, StorageError};

use super::CredentialStore;
use crate::StorageResult;

/// Error type for LMDB store operations.
#[derive(Debug, thiserror::Error)]
pub enum LmdbStoreError {
    /// Failed to open or create the LMDB environment.
    #[error("Failed to open LMDB environment: {0}")]
    EnvOpen(String),

    /// Failed to open the database within the environment.
    #[error("Failed to open database: {0}")]
    DbOpen(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<LmdbStoreError> for StorageError {
    fn from(e: LmdbStoreError) -> Self {
        StorageError::Backend {
            reason: e.to_string(),
        }
    }
}

/// Persistent credential store.
///
/// # Example
///
/// ```ignore
/// use postbox_storage::{CredentialStore, LmdbCredentialStore};
/// use postbox_core::IdentityRecord;
///
/// let store = LmdbCredentialStore::open("/var/lib/postbox", 64)?;
/// store.insert(IdentityRecord::new("a@x.com", "p1")).await?;
/// ```
pub struct LmdbCredentialStore {
    env: Env,
    db: Database<Bytes, Bytes>,
}

impl LmdbCredentialStore {
    /// Open (or create) the store.
    ///
    /// # Arguments
    ///
    /// * `path` - Directory where LMDB files will be stored
    /// * `max_size_mb` - Maximum size of the database in megabytes
    pub fn open<P: AsRef<Path>>(path: P, max_size_mb: usize) -> Result<Self, LmdbStoreError> {
        std::fs::create_dir_all(&path)?;

        // SAFETY: the environment is opened once per directory by this process.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(max_size_mb * 1024 * 1024)
                .max_dbs(1)
                .open(path.as_ref())
        }
        .map_err(|e| LmdbStoreError::EnvOpen(e.to_string()))?;

        let mut wtxn = env
            .write_txn()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        let db: Database<Bytes, Bytes> = env
            .create_database(&mut wtxn, None)
            .map_err(|e| LmdbStoreError::DbOpen(e.to_string()))?;

        wtxn.commit()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        tracing::info!(path = %path.as_ref().display(), "Opened LMDB credential store");

        Ok(Self { env, db })
    }

    /// Number of stored identities.
    pub fn len(&self) -> Result<u64, LmdbStoreError> {
        let rtxn = self
            .env
            .read_txn()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;
        self.db
            .len(&rtxn)
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))
    }

    pub fn is_empty(&self) -> Result<bool, LmdbStoreError> {
        Ok(self.len()? == 0)
    }
}

impl std::fmt::Debug for LmdbCredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LmdbCredentialStore")
            .field("path", &self.env.path())
            .finish()
    }
}

#[async_trait]
impl CredentialStore for LmdbCredentialStore {
    async fn insert(&self, record: IdentityRecord) -> StorageResult<()> {
        let key = record.identity.as_str().as_bytes();
        let value = serde_json::to_vec(&record)
            .map_err(|e| LmdbStoreError::Serialization(e.to_string()))?;

        let mut wtxn = self
            .env
            .write_txn()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        let exists = self
            .db
            .get(&wtxn, key)
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?
            .is_some();

        if exists {
            drop(wtxn);
            return Err(StorageError::identity_exists(record.identity.as_str()));
        }

        self.db
            .put(&mut wtxn, key, &value)
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        wtxn.commit()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        Ok(())
    }

    async fn lookup(&self, identity: &Identity) -> StorageResult<IdentityRecord> {
        let rtxn = self
            .env
            .read_txn()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        let bytes = self
            .db
            .get(&rtxn, identity.as_str().as_bytes())
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?
            .ok_or_else(|| StorageError::identity_not_found(identity.as_str()))?;

        let record: IdentityRecord = serde_json::from_slice(bytes)
            .map_err(|e| LmdbStoreError::Deserialization(e.to_string()))?;

        Ok(record)
    }
}
