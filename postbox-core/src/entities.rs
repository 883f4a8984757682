//! Entity structs stored and returned by Postbox.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::identity::Identity;

/// Entity type discriminator used in storage errors and log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    Identity,
    Post,
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityType::Identity => f.write_str("Identity"),
            EntityType::Post => f.write_str("Post"),
        }
    }
}

/// Credential record owned by the credential store.
///
/// Created on signup and never mutated. The secret is compared verbatim;
/// hashing is out of scope for this service.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub identity: Identity,
    pub secret: String,
}

impl IdentityRecord {
    pub fn new(identity: impl Into<Identity>, secret: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            secret: secret.into(),
        }
    }

    /// Check a presented secret against the stored one.
    pub fn secret_matches(&self, presented: &str) -> bool {
        self.secret == presented
    }
}

impl fmt::Debug for IdentityRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityRecord")
            .field("identity", &self.identity)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Sequential post identifier. Starts at 1 and is never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(transparent)]
pub struct PostId(u64);

impl PostId {
    pub const FIRST: PostId = PostId(1);

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// The id that follows this one.
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for PostId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// A stored post. The author is fixed at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub text: String,
    pub author: Identity,
}

impl Post {
    pub fn is_authored_by(&self, identity: &Identity) -> bool {
        &self.author == identity
    }

    pub fn summary(&self) -> PostSummary {
        PostSummary {
            post_id: self.id,
            text: self.text.clone(),
        }
    }
}

/// One row of a post listing, as returned to the owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PostSummary {
    #[serde(rename = "postID")]
    #[cfg_attr(feature = "openapi", schema(value_type = u64))]
    pub post_id: PostId,
    pub text: String,
}
