//! Postbox Core - Entity Types
//!
//! Pure data structures shared by every other crate: identities, credential
//! records, posts, the clock abstraction and the error taxonomy.
//! This crate contains no storage or HTTP logic.

pub mod clock;
pub mod entities;
pub mod error;
pub mod identity;

pub use clock::{Clock, FixedClock, ManualClock, SystemClock};
pub use entities::{EntityType, IdentityRecord, Post, PostId, PostSummary};
pub use error::{ConfigError, PostboxError, PostboxResult, StorageError, ValidationError};
pub use identity::{Identity, Timestamp};
