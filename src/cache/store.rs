//! Cache Store Module
//!
//! Main cache engine: a HashMap of TTL entries behind a single mutex, with
//! lazy eviction on read and an explicit sweep.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::debug;

use crate::cache::stats::Counters;
use crate::cache::{CacheEntry, CacheStats, Clock, SystemClock, DEFAULT_TTL_SECS};

/// State guarded by the cache mutex. Entries and counters change together.
struct Inner<V> {
    entries: HashMap<String, CacheEntry<V>>,
    counters: Counters,
}

// == TTL Cache ==
/// Thread-safe in-memory cache with per-entry TTL.
///
/// Every operation reads the clock once and runs in one critical section, so
/// concurrent callers see either the state before or after any operation,
/// never a half-applied one. Values are cloned out; the cache keeps
/// ownership of its entries.
pub struct TtlCache<V> {
    inner: Mutex<Inner<V>>,
    default_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> TtlCache<V> {
    // == Constructor ==
    /// Creates an empty cache on the system clock.
    ///
    /// # Arguments
    /// * `default_ttl` - TTL applied by [`TtlCache::set`]
    pub fn new(default_ttl: Duration) -> Self {
        Self::with_clock(default_ttl, Arc::new(SystemClock))
    }

    /// Creates an empty cache reading time from `clock`.
    pub fn with_clock(default_ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                counters: Counters::default(),
            }),
            default_ttl,
            clock,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns the value if found and not expired. An expired entry is
    /// removed before the miss is recorded.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now_ms();
        let mut inner = self.inner.lock();
        lookup(&mut inner, key, now)
    }

    // == Set ==
    /// Stores `value` under `key` with the default TTL.
    pub fn set(&self, key: impl Into<String>, value: V) {
        self.set_with_ttl(key, value, self.default_ttl);
    }

    /// Stores `value` under `key`, expiring `ttl` from now.
    ///
    /// An existing entry is replaced and its TTL reset.
    pub fn set_with_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let now = self.clock.now_ms();
        let entry = CacheEntry::new(value, now, ttl);
        self.inner.lock().entries.insert(key.into(), entry);
    }

    // == Get Or Insert ==
    /// Returns the live value for `key`, computing and storing it on a miss.
    ///
    /// The lookup counts as a hit or a miss exactly like [`TtlCache::get`].
    /// `compute` runs inside the cache's critical section and must not block.
    pub fn get_or_insert_with<F>(&self, key: &str, ttl: Duration, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        let now = self.clock.now_ms();
        let mut inner = self.inner.lock();
        if let Some(value) = lookup(&mut inner, key, now) {
            return value;
        }

        let value = compute();
        inner
            .entries
            .insert(key.to_string(), CacheEntry::new(value.clone(), now, ttl));
        value
    }

    // == Delete ==
    /// Removes an entry by key. Returns whether anything was removed.
    pub fn delete(&self, key: &str) -> bool {
        self.inner.lock().entries.remove(key).is_some()
    }

    // == Clear ==
    /// Removes every entry and returns how many there were.
    ///
    /// Hit/miss counters are kept.
    pub fn clear(&self) -> usize {
        let mut inner = self.inner.lock();
        let count = inner.entries.len();
        inner.entries.clear();
        count
    }

    // == Cleanup Expired ==
    /// Removes all expired entries, touched or not.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup(&self) -> usize {
        let now = self.clock.now_ms();
        let mut inner = self.inner.lock();
        let before = inner.entries.len();
        inner.entries.retain(|_, entry| !entry.is_expired_at(now));
        before - inner.entries.len()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        CacheStats::snapshot(inner.entries.len(), inner.counters)
    }

    /// Whether `key` holds a live entry. Does not touch the counters.
    pub fn contains_key(&self, key: &str) -> bool {
        let now = self.clock.now_ms();
        self.inner
            .lock()
            .entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired_at(now))
    }

    // == Length ==
    /// Returns the number of stored entries, including expired ones not yet
    /// evicted.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }
}

/// Shared read path for `get` and `get_or_insert_with`. Caller holds the lock.
fn lookup<V: Clone>(inner: &mut Inner<V>, key: &str, now: u64) -> Option<V> {
    match inner.entries.get(key).map(|entry| entry.is_expired_at(now)) {
        Some(false) => {
            let value = inner.entries.get(key).map(|entry| entry.value().clone());
            inner.counters.record_hit();
            debug!(key, "cache hit");
            value
        }
        Some(true) => {
            inner.entries.remove(key);
            inner.counters.record_miss();
            debug!(key, "cache miss: evicted expired entry");
            None
        }
        None => {
            inner.counters.record_miss();
            debug!(key, "cache miss");
            None
        }
    }
}

impl<V> fmt::Debug for TtlCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("TtlCache")
            .field("entries", &inner.entries.len())
            .field("hits", &inner.counters.hits)
            .field("misses", &inner.counters.misses)
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_TTL_SECS))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;

    fn manual_cache() -> (TtlCache<String>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(1_000_000));
        let cache = TtlCache::with_clock(Duration::from_secs(300), clock.clone());
        (cache, clock)
    }

    #[test]
    fn test_store_new() {
        let (cache, _) = manual_cache();
        assert_eq!(cache.len(), 0);
        assert!(cache.is_empty());
        assert_eq!(cache.default_ttl(), Duration::from_secs(300));
    }

    #[test]
    fn test_store_set_and_get() {
        let (cache, _) = manual_cache();

        cache.set("key1", "value1".to_string());
        assert_eq!(cache.get("key1").as_deref(), Some("value1"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let (cache, _) = manual_cache();

        assert!(cache.get("nonexistent").is_none());
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_store_overwrite() {
        let (cache, _) = manual_cache();

        cache.set("key1", "value1".to_string());
        cache.set("key1", "value2".to_string());

        assert_eq!(cache.get("key1").as_deref(), Some("value2"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_overwrite_resets_ttl() {
        let (cache, clock) = manual_cache();

        cache.set_with_ttl("key1", "a".to_string(), Duration::from_secs(1));
        clock.advance(Duration::from_millis(900));
        cache.set_with_ttl("key1", "b".to_string(), Duration::from_secs(1));
        clock.advance(Duration::from_millis(900));

        assert_eq!(cache.get("key1").as_deref(), Some("b"));
    }

    #[test]
    fn test_store_ttl_expiration() {
        let (cache, clock) = manual_cache();

        cache.set_with_ttl("key1", "value1".to_string(), Duration::from_secs(1));
        assert!(cache.get("key1").is_some());

        // At the boundary the entry is still live
        clock.advance(Duration::from_secs(1));
        assert!(cache.get("key1").is_some());

        clock.advance(Duration::from_millis(1));
        assert!(cache.get("key1").is_none());

        // Lazily evicted by the failed read
        assert_eq!(cache.stats().entries, 0);
    }

    #[test]
    fn test_default_ttl_applies() {
        let (cache, clock) = manual_cache();

        cache.set("key1", "value1".to_string());
        clock.advance(Duration::from_secs(299));
        assert!(cache.contains_key("key1"));

        clock.advance(Duration::from_secs(2));
        assert!(!cache.contains_key("key1"));
    }

    #[test]
    fn test_store_delete() {
        let (cache, _) = manual_cache();

        cache.set("key1", "value1".to_string());
        assert!(cache.delete("key1"));
        assert!(!cache.delete("key1"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_store_delete_nonexistent() {
        let (cache, _) = manual_cache();
        assert!(!cache.delete("nonexistent"));
    }

    #[test]
    fn test_store_clear() {
        let (cache, _) = manual_cache();

        cache.set("a", "1".to_string());
        cache.set("b", "2".to_string());
        cache.get("a");

        assert_eq!(cache.clear(), 2);
        assert!(cache.is_empty());
        assert_eq!(cache.clear(), 0);

        // Counters survive a clear
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn test_store_stats() {
        let (cache, _) = manual_cache();

        cache.set("key1", "value1".to_string());
        cache.get("key1"); // hit
        cache.get("nonexistent"); // miss

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.hit_ratio, 0.5);
    }

    #[test]
    fn test_store_cleanup_expired() {
        let (cache, clock) = manual_cache();

        cache.set_with_ttl("key1", "value1".to_string(), Duration::from_secs(1));
        cache.set_with_ttl("key2", "value2".to_string(), Duration::from_secs(10));
        cache.set_with_ttl("key3", "value3".to_string(), Duration::from_secs(2));

        clock.advance(Duration::from_secs(3));

        assert_eq!(cache.cleanup(), 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.cleanup(), 0);

        // The sweep does not count as lookups
        assert_eq!(cache.stats().lookups(), 0);
        assert!(cache.get("key2").is_some());
    }

    #[test]
    fn test_contains_key_does_not_count() {
        let (cache, _) = manual_cache();

        cache.set("key1", "value1".to_string());
        assert!(cache.contains_key("key1"));
        assert!(!cache.contains_key("missing"));
        assert_eq!(cache.stats().lookups(), 0);
    }

    #[test]
    fn test_get_or_insert_with() {
        let (cache, clock) = manual_cache();
        let mut calls = 0;

        let first = cache.get_or_insert_with("k", Duration::from_secs(5), || {
            calls += 1;
            "computed".to_string()
        });
        let second = cache.get_or_insert_with("k", Duration::from_secs(5), || {
            calls += 1;
            "recomputed".to_string()
        });

        assert_eq!(first, "computed");
        assert_eq!(second, "computed");
        assert_eq!(calls, 1);

        clock.advance(Duration::from_secs(6));
        let third = cache.get_or_insert_with("k", Duration::from_secs(5), || "fresh".to_string());
        assert_eq!(third, "fresh");

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
    }

    #[test]
    fn test_stored_none_is_distinct_from_missing() {
        let cache: TtlCache<Option<u32>> = TtlCache::new(Duration::from_secs(60));

        cache.set("empty", None);
        assert_eq!(cache.get("empty"), Some(None));
        assert_eq!(cache.get("absent"), None);
    }

    #[test]
    fn test_concurrent_access_keeps_counters_exact() {
        let cache = Arc::new(TtlCache::<u64>::new(Duration::from_secs(60)));
        let threads: Vec<_> = (0..8)
            .map(|t| {
                let cache = cache.clone();
                std::thread::spawn(move || {
                    for i in 0..100u64 {
                        let key = format!("k{}", i % 10);
                        cache.set(key.clone(), t * 1000 + i);
                        cache.get(&key);
                        cache.get("never-set");
                        if i % 25 == 0 {
                            cache.cleanup();
                        }
                    }
                })
            })
            .collect();

        for handle in threads {
            handle.join().unwrap();
        }

        let stats = cache.stats();
        assert_eq!(stats.hits, 800);
        assert_eq!(stats.misses, 800);
        assert_eq!(stats.entries, 10);
    }
}
