//! Short-lived result cache for read-heavy query paths.
//!
//! Time-bounded and size-bounded: entries expire after a fixed TTL
//! regardless of access, and the least-recently-used entry is evicted
//! once capacity is hit. Entries are immutable once written, so a single
//! mutex around the LRU map is all the locking needed.
//!
//! Clearing is an explicit administrative operation (gated upstream by a
//! shared-secret check) and must also run after any bulk reload of the
//! underlying dataset, or the cache will silently serve stale results.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

/// TTL + LRU bounded key-value cache.
pub struct ResultCache<V> {
    entries: Mutex<LruCache<String, Entry<V>>>,
    ttl: Duration,
}

impl<V: Clone> ResultCache<V> {
    /// Create a cache with the given TTL and capacity. A zero capacity is
    /// treated as one.
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap();
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    /// Look up a key, dropping the entry when its TTL has elapsed.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.entries.lock().unwrap();
        let expired = match entries.get(key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => {
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(key);
        }
        None
    }

    pub fn insert(&self, key: String, value: V) {
        self.entries.lock().unwrap().put(
            key,
            Entry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Return the cached value or compute, insert, and return it.
    pub fn get_or_compute<F>(&self, key: &str, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some(hit) = self.get(key) {
            return hit;
        }
        let value = compute();
        self.insert(key.to_string(), value.clone());
        value
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
