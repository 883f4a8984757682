//! Postbox Storage - Credential Stores, Post Registry and List Cache
//!
//! - [`credentials`]: the credential store adapter. A single source of truth
//!   for identity records, with in-memory and LMDB implementations.
//! - [`posts`]: the in-process post registry with its monotonic id counter.
//! - [`cache`]: the identity-scoped TTL cache used in front of post listings.

pub mod cache;
pub mod credentials;
pub mod posts;

pub use cache::{CacheConfig, CacheRead, CacheStats, IdentityCache};
pub use credentials::{
    CredentialStore, InMemoryCredentialStore, LmdbCredentialStore, LmdbStoreError,
};
pub use posts::{PostStore, Removal};

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, postbox_core::StorageError>;
