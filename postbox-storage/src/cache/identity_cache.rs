//! Per-identity TTL cache.
//!
//! A single map from [`Identity`] to the last computed value for that
//! identity. Entries expire lazily on read once they reach the configured TTL
//! and are also dropped by [`IdentityCache::purge_expired`], which the API runs
//! from a background sweep.
//!
//! Writes to the underlying data never invalidate an entry. A listing served
//! from here can therefore be up to one TTL behind the post registry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use postbox_core::{Clock, Identity, Timestamp};

use super::{CacheRead, CacheStats};

/// Configuration for [`IdentityCache`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// How long an entry stays live after it is computed.
    pub ttl: Duration,
    /// Maximum number of identities held at once. Zero disables storing.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            max_entries: 100,
        }
    }
}

impl CacheConfig {
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }
}

#[derive(Debug)]
struct Entry<V> {
    value: V,
    created_at: Timestamp,
    /// Insertion order; breaks ties between entries created in the same instant.
    seq: u64,
}

#[derive(Debug)]
struct Inner<V> {
    entries: HashMap<Identity, Entry<V>>,
    next_seq: u64,
    stats: CacheStats,
}

/// Identity-scoped cache with a fixed TTL and a bounded entry count.
pub struct IdentityCache<V> {
    inner: Mutex<Inner<V>>,
    config: CacheConfig,
    clock: Arc<dyn Clock>,
}

impl<V> std::fmt::Debug for IdentityCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityCache")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<V: Clone> IdentityCache<V> {
    pub fn new(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                next_seq: 0,
                stats: CacheStats::default(),
            }),
            config,
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<V>> {
        // Every critical section leaves the map consistent, so a panic elsewhere
        // never leaves it half-written.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_live(&self, created_at: Timestamp, now: Timestamp) -> bool {
        let age = (now - created_at).to_std().unwrap_or(Duration::ZERO);
        age < self.config.ttl
    }

    /// Return the live entry for `owner`, or run `compute` and store its result.
    ///
    /// `compute` runs without the cache lock held. Two concurrent misses for
    /// the same owner may both compute; whichever stores last wins. An error
    /// from `compute` is returned as-is and nothing is stored.
    pub fn get_or_compute<F, E>(&self, owner: &Identity, compute: F) -> Result<CacheRead<V>, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        let now = self.clock.now();
        {
            let mut inner = self.lock();
            let hit = inner
                .entries
                .get(owner)
                .filter(|entry| self.is_live(entry.created_at, now))
                .map(|entry| CacheRead::from_cache(entry.value.clone(), entry.created_at));

            match hit {
                Some(read) => {
                    inner.stats.hits += 1;
                    tracing::debug!(identity = %owner, cache = "hit", "Identity cache lookup");
                    return Ok(read);
                }
                None => {
                    inner.stats.misses += 1;
                    tracing::debug!(identity = %owner, cache = "miss", "Identity cache lookup");
                }
            }
        }

        let value = compute()?;
        let computed_at = self.clock.now();
        self.store(owner, value.clone(), computed_at);
        Ok(CacheRead::from_storage(value, computed_at))
    }

    fn store(&self, owner: &Identity, value: V, created_at: Timestamp) {
        if self.config.max_entries == 0 {
            return;
        }

        let mut inner = self.lock();
        let inner = &mut *inner;

        if !inner.entries.contains_key(owner) && inner.entries.len() >= self.config.max_entries {
            inner
                .entries
                .retain(|_, entry| self.is_live(entry.created_at, created_at));

            if inner.entries.len() >= self.config.max_entries {
                let oldest = inner
                    .entries
                    .iter()
                    .min_by_key(|(_, entry)| (entry.created_at, entry.seq))
                    .map(|(identity, _)| identity.clone());
                if let Some(victim) = oldest {
                    inner.entries.remove(&victim);
                    inner.stats.evictions += 1;
                    tracing::debug!(identity = %victim, "Evicted identity cache entry");
                }
            }
        }

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.entries.insert(
            owner.clone(),
            Entry {
                value,
                created_at,
                seq,
            },
        );
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut inner = self.lock();
        let before = inner.entries.len();
        inner
            .entries
            .retain(|_, entry| self.is_live(entry.created_at, now));
        before - inner.entries.len()
    }

    /// Number of entries held, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.lock();
        CacheStats {
            entry_count: inner.entries.len() as u64,
            ..inner.stats
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }
}
