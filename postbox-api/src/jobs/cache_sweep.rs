//! Cache Sweep Background Task
//!
//! Expired listing entries are already ignored on read, but an identity that
//! never lists again would keep its entry forever. This task purges dead
//! entries on a fixed interval so the cache only holds live snapshots.

use crate::constants::DEFAULT_CACHE_SWEEP_INTERVAL_SECS;
use crate::services::PostListCache;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Configuration for the cache sweep background task.
#[derive(Debug, Clone)]
pub struct CacheSweepConfig {
    /// How often to purge expired entries (default: 60 seconds)
    pub sweep_interval: Duration,
}

impl Default for CacheSweepConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(DEFAULT_CACHE_SWEEP_INTERVAL_SECS),
        }
    }
}

impl CacheSweepConfig {
    /// Create CacheSweepConfig from environment variables.
    ///
    /// # Environment Variables
    /// - `POSTBOX_CACHE_SWEEP_INTERVAL_SECS`: sweep interval (default: 60, zero is ignored)
    pub fn from_env() -> Self {
        let sweep_interval = Duration::from_secs(
            std::env::var("POSTBOX_CACHE_SWEEP_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|secs: &u64| *secs > 0)
                .unwrap_or(DEFAULT_CACHE_SWEEP_INTERVAL_SECS),
        );

        Self { sweep_interval }
    }
}

// ============================================================================
// METRICS
// ============================================================================

/// Counters for sweep activity.
#[derive(Debug, Default)]
pub struct CacheSweepMetrics {
    /// Sweep cycles completed
    pub sweeps: AtomicU64,

    /// Entries removed since startup
    pub entries_purged: AtomicU64,
}

impl CacheSweepMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> CacheSweepSnapshot {
        CacheSweepSnapshot {
            sweeps: self.sweeps.load(Ordering::Relaxed),
            entries_purged: self.entries_purged.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of sweep metrics at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSweepSnapshot {
    pub sweeps: u64,
    pub entries_purged: u64,
}

// ============================================================================
// BACKGROUND TASK
// ============================================================================

/// Purge expired cache entries until the shutdown signal is received.
///
/// Returns the metrics collected during the task's lifetime.
pub async fn cache_sweep_task(
    cache: Arc<PostListCache>,
    config: CacheSweepConfig,
    mut shutdown_rx: watch::Receiver<bool>,
) -> Arc<CacheSweepMetrics> {
    let metrics = Arc::new(CacheSweepMetrics::new());

    let mut sweep_interval = interval(config.sweep_interval);
    sweep_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::info!(
        sweep_interval_secs = config.sweep_interval.as_secs(),
        "Cache sweep task started"
    );

    loop {
        tokio::select! {
            changed = shutdown_rx.changed() => {
                // A dropped sender also means shutdown.
                if changed.is_err() || *shutdown_rx.borrow() {
                    tracing::info!("Cache sweep task shutting down");
                    break;
                }
            }

            _ = sweep_interval.tick() => {
                sweep_once(&cache, &metrics);
            }
        }
    }

    let snapshot = metrics.snapshot();
    tracing::info!(
        sweeps = snapshot.sweeps,
        entries_purged = snapshot.entries_purged,
        "Cache sweep task completed"
    );

    metrics
}

fn sweep_once(cache: &PostListCache, metrics: &CacheSweepMetrics) {
    metrics.sweeps.fetch_add(1, Ordering::Relaxed);

    let purged = cache.purge_expired();
    if purged > 0 {
        metrics
            .entries_purged
            .fetch_add(purged as u64, Ordering::Relaxed);
        tracing::debug!(purged, remaining = cache.len(), "Cache sweep removed expired entries");
    } else {
        tracing::trace!("Cache sweep found nothing to remove");
    }
}
