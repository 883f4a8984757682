//! Credential store adapter.
//!
//! Identity records live behind the [`CredentialStore`] trait so the rest of
//! the service never touches the persistence engine directly. There is exactly
//! one store per process; nothing else keeps a copy of the records.
//!
//! # Atomicity
//!
//! `insert` is a single check-and-insert. Two concurrent signups for the same
//! identity produce one success and one [`StorageError::AlreadyExists`](postbox_core::StorageError::AlreadyExists).

mod lmdb;
mod memory;

use async_trait::async_trait;
use postbox_core::{Identity, IdentityRecord};

pub use lmdb::{LmdbCredentialStore, LmdbStoreError};
pub use memory::InMemoryCredentialStore;

use crate::StorageResult;

/// Persistence collaborator for identity records.
///
/// Implementations must be thread-safe; the HTTP layer shares one instance
/// across all request handlers.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert a new record.
    ///
    /// Fails with [`StorageError::AlreadyExists`](postbox_core::StorageError::AlreadyExists) if the identity is already
    /// present. The existing record is left untouched.
    async fn insert(&self, record: IdentityRecord) -> StorageResult<()>;

    /// Fetch the record for an identity.
    ///
    /// Fails with [`StorageError::NotFound`](postbox_core::StorageError::NotFound) if the identity is unknown.
    async fn lookup(&self, identity: &Identity) -> StorageResult<IdentityRecord>;

    /// Check whether an identity is registered.
    async fn contains(&self, identity: &Identity) -> StorageResult<bool> {
        match self.lookup(identity).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}
