use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use postbox_core::{Identity, IdentityRecord, StorageError};

use super::CredentialStore;
use crate::StorageResult;

/// In-process credential store backed by a sharded concurrent map.
///
/// The insert-if-absent check runs under the shard lock held by
/// [`DashMap::entry`], so it is atomic with respect to other inserts.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    records: DashMap<Identity, IdentityRecord>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered identities.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn insert(&self, record: IdentityRecord) -> StorageResult<()> {
        match self.records.entry(record.identity.clone()) {
            Entry::Occupied(_) => Err(StorageError::identity_exists(record.identity.as_str())),
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(())
            }
        }
    }

    async fn lookup(&self, identity: &Identity) -> StorageResult<IdentityRecord> {
        self.records
            .get(identity.as_str())
            .map(|record| record.value().clone())
            .ok_or_else(|| StorageError::identity_not_found(identity.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_insert_then_lookup() -> StorageResult<()> {
        let store = InMemoryCredentialStore::new();
        store.insert(IdentityRecord::new("a@x.com", "p1")).await?;

        let record = store.lookup(&Identity::new("a@x.com")).await?;
        assert_eq!(record.identity.as_str(), "a@x.com");
        assert!(record.secret_matches("p1"));
        assert_eq!(store.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_insert_keeps_original() -> StorageResult<()> {
        let store = InMemoryCredentialStore::new();
        store.insert(IdentityRecord::new("a@x.com", "p1")).await?;

        let result = store.insert(IdentityRecord::new("a@x.com", "other")).await;
        assert_eq!(result, Err(StorageError::identity_exists("a@x.com")));

        let record = store.lookup(&Identity::new("a@x.com")).await?;
        assert!(record.secret_matches("p1"));
        Ok(())
    }

    #[tokio::test]
    async fn test_lookup_unknown_identity() {
        let store = InMemoryCredentialStore::new();
        let result = store.lookup(&Identity::new("nobody@x.com")).await;
        assert!(matches!(result, Err(StorageError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_contains() -> StorageResult<()> {
        let store = InMemoryCredentialStore::new();
        store.insert(IdentityRecord::new("a@x.com", "p1")).await?;
        assert!(store.contains(&Identity::new("a@x.com")).await?);
        assert!(!store.contains(&Identity::new("b@x.com")).await?);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_signups_single_winner() {
        let store = Arc::new(InMemoryCredentialStore::new());

        let mut handles = Vec::new();
        for i in 0..32 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .insert(IdentityRecord::new("race@x.com", format!("secret-{}", i)))
                    .await
            }));
        }

        let mut successes = 0;
        for handle in handles {
            if let Ok(Ok(())) = handle.await {
                successes += 1;
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(store.len(), 1);
    }
}
