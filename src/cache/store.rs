//! Cache Store Module
//!
//! Main cache engine: a sharded concurrent map of type-tagged values with a
//! full-flush capacity bound.

use std::any::{type_name, Any};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::cache::{CacheEntry, CacheStats, StatsSnapshot, DEFAULT_CAPACITY};
use crate::error::CacheError;

// == Object Cache ==
/// Process-wide, size-bounded cache of domain objects.
///
/// Built once at startup and shared behind an `Arc` by every service. All
/// operations are synchronous and never block on I/O.
///
/// # Eviction
/// When a put finds the cache holding `capacity` or more entries, the whole
/// cache is cleared before the new entry goes in. The size check runs before
/// every put, including one that overwrites an existing key. This is a crude
/// bound, not LRU: a deployment with a hot working set near the capacity
/// would want single-entry eviction instead.
///
/// # Concurrency
/// Entries live in a [`DashMap`], so lookups and inserts on different keys
/// only contend when they hash to the same shard. A `gate` lock is taken
/// shared by get/put/evict and exclusively by clear and by the flush path,
/// so nobody observes a half-flushed table. Puts racing on the capacity
/// check may overshoot `capacity` by the number of racers; the next put
/// flushes it back down.
#[derive(Debug)]
pub struct ObjectCache {
    /// Key-value storage
    entries: DashMap<String, CacheEntry>,
    /// Shared by point operations, exclusive for full clears
    gate: RwLock<()>,
    /// Performance statistics
    stats: CacheStats,
    /// Entry count that triggers a flush on the next put
    capacity: usize,
}

impl ObjectCache {
    // == Constructor ==
    /// Creates an empty cache holding at most `capacity` entries.
    ///
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            gate: RwLock::new(()),
            stats: CacheStats::new(),
            capacity: capacity.max(1),
        }
    }

    // == Get ==
    /// Looks up `key` and returns its value as a `T`.
    ///
    /// Returns `Ok(None)` on a miss. A value stored under a different type
    /// is reported as [`CacheError::TypeMismatch`], never as a miss.
    pub fn get<T>(&self, key: &str) -> Result<Option<Arc<T>>, CacheError>
    where
        T: Any + Send + Sync,
    {
        let entry = {
            let _gate = self.gate.read();
            self.entries.get(key).map(|entry| entry.value().clone())
        };

        let Some(entry) = entry else {
            self.stats.record_miss();
            debug!(key, "Cache miss");
            return Ok(None);
        };

        self.stats.record_hit();
        debug!(key, "Cache hit");

        entry
            .downcast::<T>()
            .map(Some)
            .ok_or_else(|| CacheError::TypeMismatch {
                key: key.to_string(),
                expected: type_name::<T>(),
                found: entry.type_name(),
            })
    }

    // == Put ==
    /// Stores `value` under `key`, replacing any previous value.
    pub fn put<T>(&self, key: impl Into<String>, value: T)
    where
        T: Any + Send + Sync,
    {
        self.put_arc(key, Arc::new(value));
    }

    /// Stores an already shared value under `key`.
    ///
    /// If the cache holds `capacity` or more entries, it is flushed first.
    pub fn put_arc<T>(&self, key: impl Into<String>, value: Arc<T>)
    where
        T: Any + Send + Sync,
    {
        let key = key.into();
        let entry = CacheEntry::from_arc(value);

        let gate = self.gate.read();
        if self.entries.len() < self.capacity {
            self.entries.insert(key.clone(), entry);
            drop(gate);
        } else {
            drop(gate);
            let _gate = self.gate.write();
            // Another put may have flushed while we waited.
            if self.entries.len() >= self.capacity {
                self.flush();
            }
            self.entries.insert(key.clone(), entry);
        }

        self.stats.record_insert();
        debug!(key = %key, "Added to cache");
    }

    // == Evict ==
    /// Removes the entry for `key`.
    ///
    /// Returns true if an entry was removed; evicting an absent key is a no-op.
    pub fn evict(&self, key: &str) -> bool {
        let removed = {
            let _gate = self.gate.read();
            self.entries.remove(key).is_some()
        };

        if removed {
            self.stats.record_eviction();
        }
        debug!(key, removed, "Evicted from cache");
        removed
    }

    // == Clear ==
    /// Removes every entry. Statistics are kept.
    pub fn clear(&self) {
        let _gate = self.gate.write();
        self.entries.clear();
        info!("Cache cleared");
    }

    // == Flush ==
    /// Capacity-triggered clear. Caller must hold the gate exclusively.
    fn flush(&self) {
        let dropped = self.entries.len();
        self.entries.clear();
        self.stats.record_flush();
        info!(
            capacity = self.capacity,
            dropped, "Cache is full, cleared all entries"
        );
    }

    // == Contains ==
    /// Returns true if `key` has a value, without touching the statistics.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot(self.entries.len(), self.capacity)
    }

    // == Capacity ==
    /// Returns the configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ObjectCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
