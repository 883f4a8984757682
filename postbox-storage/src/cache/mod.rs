//! Identity-scoped TTL cache for post listings.
//!
//! Entries are keyed by the authenticated identity, so one identity's listing
//! can never be served to another. Staleness is explicit: every read comes back
//! as a [`CacheRead<T>`] carrying when the value was computed and whether it
//! came from the cache.
//!
//! # Example
//!
//! ```ignore
//! let read = cache.get_or_compute(&owner, || posts.list_by_author(&owner))?;
//! if read.was_cache_hit() {
//!     tracing::debug!(age = ?read.age_at(clock.now()), "served cached listing");
//! }
//! ```

pub mod identity_cache;
pub mod read;
pub mod stats;

pub use identity_cache::{CacheConfig, IdentityCache};
pub use read::CacheRead;
pub use stats::CacheStats;
