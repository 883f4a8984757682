//! Read results that carry their own staleness.

use std::time::Duration;

use postbox_core::Timestamp;

/// Result of a cache read.
///
/// A hit may be up to one TTL old; callers that care can inspect
/// [`CacheRead::age_at`] before using the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheRead<T> {
    value: T,
    /// When the value was computed, not when it was read.
    cached_at: Timestamp,
    was_cache_hit: bool,
}

impl<T> CacheRead<T> {
    /// A value served from a live cache entry.
    pub fn from_cache(value: T, cached_at: Timestamp) -> Self {
        Self {
            value,
            cached_at,
            was_cache_hit: true,
        }
    }

    /// A value computed just now on a miss.
    pub fn from_storage(value: T, computed_at: Timestamp) -> Self {
        Self {
            value,
            cached_at: computed_at,
            was_cache_hit: false,
        }
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn cached_at(&self) -> Timestamp {
        self.cached_at
    }

    pub fn was_cache_hit(&self) -> bool {
        self.was_cache_hit
    }

    /// How old the value is at `now`. Zero if `now` precedes the computation.
    pub fn age_at(&self, now: Timestamp) -> Duration {
        (now - self.cached_at).to_std().unwrap_or(Duration::ZERO)
    }

    /// Transform the value, keeping the staleness metadata.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> CacheRead<U> {
        CacheRead {
            value: f(self.value),
            cached_at: self.cached_at,
            was_cache_hit: self.was_cache_hit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn at(secs: i64) -> Timestamp {
        DateTime::from_timestamp(secs, 0).unwrap_or_default()
    }

    #[test]
    fn test_age_at() {
        let read = CacheRead::from_cache(vec![1, 2], at(100));
        assert!(read.was_cache_hit());
        assert_eq!(read.age_at(at(130)), Duration::from_secs(30));
        assert_eq!(read.age_at(at(50)), Duration::ZERO);
    }

    #[test]
    fn test_map_keeps_metadata() {
        let read = CacheRead::from_storage(vec![1, 2, 3], at(10)).map(|v| v.len());
        assert!(!read.was_cache_hit());
        assert_eq!(read.cached_at(), at(10));
        assert_eq!(read.into_value(), 3);
    }
}
