//! Eviction Engine Module
//!
//! Capacity-bounded key/value store with least-recently-used eviction.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::lru::{CacheEntry, CacheStats, RecencyList};

// == Engine State ==
/// Everything guarded by the engine lock.
#[derive(Debug, Default)]
struct Inner {
    /// Key to recency-list slot
    index: HashMap<String, usize>,
    /// Entries ordered most to least recently used
    order: RecencyList<CacheEntry>,
    /// Sum of all entry weights
    weight: u64,
    stats: CacheStats,
}

impl Inner {
    fn upsert(&mut self, key: String, value: Vec<u8>, weight: u64) {
        if let Some(&idx) = self.index.get(&key) {
            if let Some(entry) = self.order.get_mut(idx) {
                let old = entry.replace(value, weight);
                self.weight = self.weight - old + weight;
            }
            self.order.move_to_front(idx);
            self.stats.record_update();
            return;
        }

        let idx = self
            .order
            .push_front(CacheEntry::new(key.clone(), value, weight));
        self.index.insert(key, idx);
        self.weight += weight;
        self.stats.record_insertion();
    }

    /// Evicts from the tail until the total fits. The head entry is never
    /// evicted, so a lone oversized item stays resident.
    fn evict_to(&mut self, capacity: u64) -> usize {
        let mut evicted = 0;
        while self.weight > capacity && self.order.len() > 1 {
            let Some(entry) = self.order.pop_back() else {
                break;
            };
            self.index.remove(&entry.key);
            self.weight -= entry.weight;
            self.stats.record_eviction();
            evicted += 1;
        }
        evicted
    }

    fn remove(&mut self, key: &str) -> bool {
        let Some(idx) = self.index.remove(key) else {
            return false;
        };
        if let Some(entry) = self.order.remove(idx) {
            self.weight -= entry.weight;
        }
        true
    }
}

// == LRU Cache ==
/// Bounded key/value store with recency-ordered eviction.
///
/// Every operation, including `get`, takes a single exclusive lock because
/// lookups reorder the recency list. Hold time is O(1) plus the number of
/// entries evicted by the call.
///
/// After each `set` the total weight is at most `capacity`, with one
/// exception: an item whose own weight exceeds `capacity` is still admitted.
/// It evicts every other entry and remains the only resident item until the
/// next write pushes it out.
#[derive(Debug)]
pub struct LruCache {
    capacity: u64,
    inner: Mutex<Inner>,
}

impl LruCache {
    // == Constructor ==
    /// Creates an empty engine bounded by `capacity` weight units.
    pub fn new(capacity: u64) -> Self {
        Self {
            capacity,
            inner: Mutex::new(Inner::default()),
        }
    }

    // == Get ==
    /// Looks up a key, promoting it to most recently used on a hit.
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        let mut inner = self.lock();
        let Some(&idx) = inner.index.get(key) else {
            inner.stats.record_miss();
            return None;
        };

        inner.order.move_to_front(idx);
        inner.stats.record_hit();
        inner.order.get(idx).map(|entry| entry.value.clone())
    }

    // == Peek ==
    /// Returns a copy of the value without touching recency or stats.
    pub fn peek(&self, key: &str) -> Option<Vec<u8>> {
        let inner = self.lock();
        let idx = *inner.index.get(key)?;
        inner.order.get(idx).map(|entry| entry.value.clone())
    }

    // == Set ==
    /// Inserts or replaces `key`, then evicts least recently used entries
    /// until the total weight fits the capacity again.
    ///
    /// Returns the number of entries evicted.
    pub fn set(&self, key: impl Into<String>, value: Vec<u8>, weight: u64) -> usize {
        let key = key.into();
        let mut inner = self.lock();
        inner.upsert(key, value, weight);
        let evicted = inner.evict_to(self.capacity);

        if inner.weight > self.capacity {
            debug!(
                weight,
                capacity = self.capacity,
                "Admitted oversized item as sole cache entry"
            );
        }
        evicted
    }

    // == Delete ==
    /// Removes a key. Absent keys are ignored.
    ///
    /// Returns true if an entry was removed.
    pub fn delete(&self, key: &str) -> bool {
        self.lock().remove(key)
    }

    // == Clear ==
    /// Drops every entry. Capacity and counters are kept.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.index.clear();
        inner.order.clear();
        inner.weight = 0;
    }

    // == Introspection ==
    /// Maximum total weight before eviction kicks in.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Current sum of entry weights.
    pub fn weight(&self) -> u64 {
        self.lock().weight
    }

    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.lock().index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().index.is_empty()
    }

    /// Checks membership without promoting the key.
    pub fn contains(&self, key: &str) -> bool {
        self.lock().index.contains_key(key)
    }

    /// Keys ordered from most to least recently used.
    pub fn keys(&self) -> Vec<String> {
        self.lock()
            .order
            .iter()
            .map(|entry| entry.key.clone())
            .collect()
    }

    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let inner = self.lock();
        let mut stats = inner.stats.clone();
        stats.total_entries = inner.index.len();
        stats.total_weight = inner.weight;
        stats
    }

    /// Every operation leaves `Inner` consistent before it can panic, so a
    /// poisoned lock still guards valid state.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
