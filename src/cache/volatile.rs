//! In-memory store for short-lived computed results.
//!
//! TTL is supplied per lookup, not per entry, so one store can serve request
//! classes with very different staleness budgets. Stale entries are not
//! purged proactively; they are replaced on the next write or ignored by
//! `get()`. Underneath the TTL check the store is bounded by entry count with
//! least-recently-used eviction.

use super::clock::{Clock, SystemClock};
use super::entry::{next_stored_at, CacheEntry};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Default entry bound when none is configured.
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// A thread-safe, count-bounded, TTL-checked in-memory store.
///
/// The store is cheap to clone; clones share the same entries.
#[derive(Clone)]
pub struct VolatileStore<T>
where
    T: Clone,
{
    entries: Arc<Mutex<LruCache<String, CacheEntry<T>>>>,
    clock: Arc<dyn Clock>,
}

impl<T> VolatileStore<T>
where
    T: Clone,
{
    /// Create a store holding at most `max_entries` entries (minimum 1).
    pub fn new(max_entries: usize) -> Self {
        Self::with_clock(max_entries, Arc::new(SystemClock))
    }

    /// Create a store that stamps entries using `clock`.
    pub fn with_clock(max_entries: usize, clock: Arc<dyn Clock>) -> Self {
        let capacity = NonZeroUsize::new(max_entries.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Arc::new(Mutex::new(LruCache::new(capacity))),
            clock,
        }
    }

    /// Get the entry for `key` if it exists and is younger than `ttl`.
    ///
    /// A hit marks the entry as recently used.
    pub fn get(&self, key: &str, ttl: Duration) -> Option<CacheEntry<T>> {
        let now = self.clock.now();

        let mut entries = self.entries.lock().ok()?;
        let fresh = entries
            .peek(key)
            .map(|entry| entry.is_fresh(ttl, now))
            .unwrap_or(false);

        if fresh {
            entries.get(key).cloned()
        } else {
            None
        }
    }

    /// Store `value` under `key`, replacing any previous entry.
    ///
    /// If the store is full, the least recently used entry is evicted.
    pub fn set(&self, key: impl Into<String>, value: T) {
        let key = key.into();
        let now = self.clock.now();

        if let Ok(mut entries) = self.entries.lock() {
            let previous = entries.peek(&key).map(|entry| entry.stored_at);
            let entry = CacheEntry::new(key.clone(), value, next_stored_at(previous, now));
            if let Some((evicted, _)) = entries.push(key.clone(), entry) {
                if evicted != key {
                    tracing::trace!(key = %evicted, "Evicted least recently used entry");
                }
            }
        }
    }

    /// Remove a specific key.
    pub fn invalidate(&self, key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.pop(key);
        }
    }

    /// Remove every entry whose key starts with `prefix`. Returns how many were removed.
    pub fn invalidate_by_prefix(&self, prefix: &str) -> usize {
        let Ok(mut entries) = self.entries.lock() else {
            return 0;
        };

        let doomed: Vec<String> = entries
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &doomed {
            entries.pop(key.as_str());
        }

        doomed.len()
    }

    /// Clear all entries.
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    /// Remove entries older than `ttl`. Returns how many were removed.
    ///
    /// Not required for correctness: `get()` already ignores stale entries.
    pub fn purge_expired(&self, ttl: Duration) -> usize {
        let now = self.clock.now();
        let Ok(mut entries) = self.entries.lock() else {
            return 0;
        };

        let stale: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| !entry.is_fresh(ttl, now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &stale {
            entries.pop(key.as_str());
        }

        stale.len()
    }

    /// Number of entries held (including stale ones).
    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of entries before LRU eviction kicks in.
    pub fn capacity(&self) -> usize {
        self.entries
            .lock()
            .map(|entries| entries.cap().get())
            .unwrap_or(0)
    }
}

impl<T> std::fmt::Debug for VolatileStore<T>
where
    T: Clone,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VolatileStore")
            .field("entries", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::clock::ManualClock;
    use std::thread;

    const TTL: Duration = Duration::from_secs(3);

    fn store_with_clock(max: usize) -> (VolatileStore<&'static str>, ManualClock) {
        let clock = ManualClock::default();
        (VolatileStore::with_clock(max, Arc::new(clock.clone())), clock)
    }

    #[test]
    fn test_set_then_get() {
        let (store, _) = store_with_clock(16);
        store.set("key1", "value1");

        let entry = store.get("key1", TTL).unwrap();
        assert_eq!(entry.value, "value1");
        assert_eq!(entry.key, "key1");
        assert!(store.get("key2", TTL).is_none());
    }

    #[test]
    fn test_set_then_get_with_tiny_ttl() {
        let (store, _) = store_with_clock(16);
        store.set("key1", "value1");
        assert!(store.get("key1", Duration::from_nanos(1)).is_some());
    }

    #[test]
    fn test_ttl_expiration() {
        let (store, clock) = store_with_clock(16);
        store.set("key1", "value1");

        clock.advance(Duration::from_millis(2999));
        assert!(store.get("key1", TTL).is_some());

        clock.advance(Duration::from_millis(1));
        assert!(store.get("key1", TTL).is_none());

        // Stale entries linger until overwritten
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_same_entry_different_ttl_classes() {
        let (store, clock) = store_with_clock(16);
        store.set("key1", "value1");
        clock.advance(Duration::from_secs(10));

        assert!(store.get("key1", TTL).is_none());
        assert!(store.get("key1", Duration::from_secs(3600)).is_some());
    }

    #[test]
    fn test_overwrite_refreshes_timestamp() {
        let (store, clock) = store_with_clock(16);
        store.set("key1", "old");
        clock.advance(Duration::from_secs(5));
        store.set("key1", "new");

        let entry = store.get("key1", TTL).unwrap();
        assert_eq!(entry.value, "new");
    }

    #[test]
    fn test_stored_at_never_goes_backwards() {
        let (store, clock) = store_with_clock(16);
        store.set("key1", "first");
        let first = store.get("key1", TTL).unwrap().stored_at;

        clock.set(first - chrono::Duration::seconds(30));
        store.set("key1", "second");

        let second = store.get("key1", Duration::from_secs(3600)).unwrap();
        assert_eq!(second.value, "second");
        assert!(second.stored_at >= first);
    }

    #[test]
    fn test_invalidate() {
        let (store, _) = store_with_clock(16);
        store.set("key1", "value1");
        store.set("key2", "value2");

        store.invalidate("key1");

        assert!(store.get("key1", TTL).is_none());
        assert!(store.get("key2", TTL).is_some());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_invalidate_by_prefix_overlapping() {
        let (store, _) = store_with_clock(16);
        store.set("quote:a:b:1", "1");
        store.set("quote:a:b:2", "2");
        store.set("quote:a:c:1", "3");
        store.set("price:a", "4");

        assert_eq!(store.invalidate_by_prefix("quote:a:b:"), 2);
        assert!(store.get("quote:a:c:1", TTL).is_some());
        assert!(store.get("price:a", TTL).is_some());

        assert_eq!(store.invalidate_by_prefix("quote:"), 1);
        assert!(store.get("price:a", TTL).is_some());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_invalidate_by_prefix_no_match() {
        let (store, _) = store_with_clock(16);
        store.set("quote:a", "1");
        assert_eq!(store.invalidate_by_prefix("price:"), 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_clear() {
        let (store, _) = store_with_clock(16);
        store.set("key1", "value1");
        store.set("key2", "value2");

        store.clear();

        assert!(store.is_empty());
    }

    #[test]
    fn test_lru_eviction() {
        let (store, _) = store_with_clock(2);
        store.set("a", "1");
        store.set("b", "2");

        // Touch "a" so "b" becomes the eviction candidate
        assert!(store.get("a", TTL).is_some());
        store.set("c", "3");

        assert_eq!(store.len(), 2);
        assert!(store.get("a", TTL).is_some());
        assert!(store.get("b", TTL).is_none());
        assert!(store.get("c", TTL).is_some());
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let store: VolatileStore<u8> = VolatileStore::new(0);
        assert_eq!(store.capacity(), 1);
    }

    #[test]
    fn test_purge_expired() {
        let (store, clock) = store_with_clock(16);
        store.set("old", "1");
        clock.advance(Duration::from_secs(5));
        store.set("new", "2");

        assert_eq!(store.purge_expired(TTL), 1);
        assert_eq!(store.len(), 1);
        assert!(store.get("new", TTL).is_some());
    }

    #[test]
    fn test_clone_shares_entries() {
        let store1: VolatileStore<String> = VolatileStore::new(16);
        let store2 = store1.clone();

        store2.set("key1", "value1".to_string());
        assert_eq!(store1.get("key1", TTL).unwrap().value, "value1");
    }

    #[test]
    fn test_concurrent_access() {
        let store: VolatileStore<String> = VolatileStore::new(1_000);
        let store_clone = store.clone();

        let handle = thread::spawn(move || {
            for i in 0..100 {
                store_clone.set(format!("key{}", i), format!("value{}", i));
            }
        });

        for i in 100..200 {
            store.set(format!("key{}", i), format!("value{}", i));
        }

        handle.join().unwrap();

        assert_eq!(store.len(), 200);
    }

    #[test]
    fn test_debug_format() {
        let store: VolatileStore<u8> = VolatileStore::new(4);
        let debug_str = format!("{:?}", store);
        assert!(debug_str.contains("VolatileStore"));
        assert!(debug_str.contains("capacity"));
    }
}
