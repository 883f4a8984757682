//! Clock abstraction for token expiry and cache TTLs.
//!
//! Token validation and cache expiry read time through [`Clock`] so tests can
//! pin or advance time deterministically instead of sleeping.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use crate::identity::Timestamp;

/// Source of wall-clock time.
pub trait Clock: Send + Sync {
    /// Current time in UTC.
    fn now(&self) -> Timestamp;

    /// Current time as Unix epoch seconds.
    ///
    /// Negative for pre-1970 times; callers that need a sane clock must
    /// treat that as an error.
    fn now_epoch_secs(&self) -> i64 {
        self.now().timestamp()
    }
}

/// Production clock using system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

/// Clock frozen at a Unix epoch second.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        DateTime::from_timestamp(self.0, 0).unwrap_or_default()
    }

    fn now_epoch_secs(&self) -> i64 {
        self.0
    }
}

/// Clock that only moves when told to. Shared across threads.
#[derive(Debug)]
pub struct ManualClock {
    epoch_millis: AtomicI64,
}

impl ManualClock {
    /// Start at the given Unix epoch second.
    pub fn starting_at(epoch_secs: i64) -> Self {
        Self {
            epoch_millis: AtomicI64::new(epoch_secs.saturating_mul(1000)),
        }
    }

    /// Move time forward.
    pub fn advance(&self, by: Duration) {
        let millis = i64::try_from(by.as_millis()).unwrap_or(i64::MAX);
        self.epoch_millis.fetch_add(millis, Ordering::SeqCst);
    }

    /// Jump to an absolute Unix epoch second.
    pub fn set_epoch_secs(&self, epoch_secs: i64) {
        self.epoch_millis
            .store(epoch_secs.saturating_mul(1000), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        DateTime::from_timestamp_millis(self.epoch_millis.load(Ordering::SeqCst))
            .unwrap_or_default()
    }
}
