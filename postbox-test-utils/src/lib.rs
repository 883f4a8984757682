//! Postbox Test Utilities
//!
//! Shared test infrastructure for the Postbox workspace:
//! - Proptest generators for identities, secrets and post text
//! - Test fixtures for common scenarios
//! - A credential store that always fails, for error-path tests
//! - Custom assertions for storage results

pub use postbox_core::{
    EntityType, Identity, IdentityRecord, Post, PostId, PostSummary, StorageError,
};
pub use postbox_storage::{CredentialStore, InMemoryCredentialStore, StorageResult};

use async_trait::async_trait;

// ============================================================================
// MOCK STORES
// ============================================================================

/// Credential store whose every call fails with a backend error.
#[derive(Debug, Clone)]
pub struct FailingCredentialStore {
    reason: String,
}

impl FailingCredentialStore {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn error(&self) -> StorageError {
        StorageError::Backend {
            reason: self.reason.clone(),
        }
    }
}

#[async_trait]
impl CredentialStore for FailingCredentialStore {
    async fn insert(&self, _record: IdentityRecord) -> StorageResult<()> {
        Err(self.error())
    }

    async fn lookup(&self, _identity: &Identity) -> StorageResult<IdentityRecord> {
        Err(self.error())
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for Postbox inputs.

    use super::*;
    use proptest::prelude::*;

    /// Generate an email-shaped identity such as `k3x@ab.com`.
    pub fn arb_email() -> impl Strategy<Value = String> {
        ("[a-z][a-z0-9]{0,11}", "[a-z]{2,8}", prop::sample::select(vec!["com", "org", "net"]))
            .prop_map(|(local, domain, tld)| format!("{}@{}.{}", local, domain, tld))
    }

    pub fn arb_identity() -> impl Strategy<Value = Identity> {
        arb_email().prop_map(Identity::new)
    }

    /// Two identities that are guaranteed to differ.
    pub fn arb_identity_pair() -> impl Strategy<Value = (Identity, Identity)> {
        (arb_identity(), arb_identity()).prop_filter("identities must differ", |(a, b)| a != b)
    }

    /// Generate a non-empty printable secret.
    pub fn arb_secret() -> impl Strategy<Value = String> {
        "[!-~]{1,32}"
    }

    /// Generate post text, including the empty string.
    pub fn arb_post_text() -> impl Strategy<Value = String> {
        "[ -~]{0,64}"
    }

    pub fn arb_identity_record() -> impl Strategy<Value = IdentityRecord> {
        (arb_identity(), arb_secret()).prop_map(|(identity, secret)| IdentityRecord::new(identity, secret))
    }

    /// A sequence of `(author index, text)` pairs over `authors` identities.
    pub fn arb_post_script(
        authors: usize,
        max_len: usize,
    ) -> impl Strategy<Value = Vec<(usize, String)>> {
        prop::collection::vec((0..authors.max(1), arb_post_text()), 0..=max_len)
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Canonical identities and prepared stores.

    use super::*;

    pub const ALICE: &str = "a@x.com";
    pub const ALICE_SECRET: &str = "p1";
    pub const BOB: &str = "b@x.com";
    pub const BOB_SECRET: &str = "p2";

    /// 2024-01-01 00:00:00 UTC
    pub const EPOCH_2024: i64 = 1_704_067_200;

    pub fn alice() -> Identity {
        Identity::new(ALICE)
    }

    pub fn bob() -> Identity {
        Identity::new(BOB)
    }

    pub fn alice_record() -> IdentityRecord {
        IdentityRecord::new(ALICE, ALICE_SECRET)
    }

    pub fn bob_record() -> IdentityRecord {
        IdentityRecord::new(BOB, BOB_SECRET)
    }

    /// In-memory store holding alice and bob.
    pub async fn seeded_credentials() -> StorageResult<InMemoryCredentialStore> {
        let store = InMemoryCredentialStore::new();
        store.insert(alice_record()).await?;
        store.insert(bob_record()).await?;
        Ok(store)
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions on storage results.

    use super::*;

    /// Assert that a result is an `AlreadyExists` for the given entity type.
    pub fn assert_already_exists<T: std::fmt::Debug>(
        result: &StorageResult<T>,
        entity_type: EntityType,
    ) {
        match result {
            Err(StorageError::AlreadyExists { entity_type: actual, .. }) => {
                assert_eq!(*actual, entity_type, "AlreadyExists for the wrong entity type");
            }
            other => panic!("Expected AlreadyExists({}), got {:?}", entity_type, other),
        }
    }

    /// Assert that a result is a `NotFound` for the given entity type.
    pub fn assert_not_found<T: std::fmt::Debug>(result: &StorageResult<T>, entity_type: EntityType) {
        match result {
            Err(StorageError::NotFound { entity_type: actual, .. }) => {
                assert_eq!(*actual, entity_type, "NotFound for the wrong entity type");
            }
            other => panic!("Expected NotFound({}), got {:?}", entity_type, other),
        }
    }

    /// Assert that post ids are strictly ascending.
    pub fn assert_ascending_ids(posts: &[PostSummary]) {
        for pair in posts.windows(2) {
            assert!(
                pair[0].post_id < pair[1].post_id,
                "post ids out of order: {} then {}",
                pair[0].post_id,
                pair[1].post_id
            );
        }
    }
}
