//! In-memory cache store with TTL support

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use super::config::DEFAULT_MAX_VALUE_SIZE;
use super::error::{CacheError, CacheResult};
use super::store::{CacheStats, CacheStore};

/// Cache entry with value and expiration
struct CacheEntry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    /// A TTL too large to represent as an `Instant` never expires.
    fn new(value: &[u8], ttl: Option<Duration>) -> Self {
        Self {
            value: value.to_vec(),
            expires_at: ttl.and_then(|d| Instant::now().checked_add(d)),
        }
    }

    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| Instant::now() > exp)
    }

    fn ttl_remaining(&self) -> Option<Duration> {
        self.expires_at.and_then(|exp| {
            let now = Instant::now();
            if now < exp { Some(exp - now) } else { None }
        })
    }
}

/// In-memory cache stats (internal)
#[derive(Default)]
struct InMemoryStats {
    hits: u64,
    misses: u64,
    sets: u64,
    deletes: u64,
    cas_conflicts: u64,
}

/// Thread-safe in-memory cache with TTL support
///
/// Clones share the same storage, so one instance can back several
/// caching cursors at once.
///
/// # Eviction Behavior
///
/// When `max_entries` is reached, the cache evicts an arbitrary entry (the first
/// one returned by `HashMap` iteration). This is NOT true FIFO/LRU eviction because
/// `HashMap` does not preserve insertion order.
///
/// # Compare-and-swap
///
/// [`CacheStore::compare_and_swap`] is atomic with respect to every other
/// operation on the same instance: the check and the write happen under one
/// write lock.
#[derive(Clone)]
pub struct InMemoryCache {
    store: Arc<RwLock<HashMap<String, CacheEntry>>>,
    stats: Arc<RwLock<InMemoryStats>>,
    max_entries: Option<usize>,
    max_value_size: usize,
    default_ttl: Option<Duration>,
}

impl std::fmt::Debug for InMemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryCache")
            .field("max_entries", &self.max_entries)
            .field("max_value_size", &self.max_value_size)
            .field("default_ttl", &self.default_ttl)
            .field("entry_count", &self.store.read().len())
            .finish_non_exhaustive()
    }
}

impl InMemoryCache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(HashMap::new())),
            stats: Arc::new(RwLock::new(InMemoryStats::default())),
            max_entries: None,
            max_value_size: DEFAULT_MAX_VALUE_SIZE,
            default_ttl: None,
        }
    }

    #[must_use]
    pub const fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = Some(max);
        self
    }

    #[must_use]
    pub const fn with_max_value_size(mut self, max: usize) -> Self {
        self.max_value_size = max;
        self
    }

    #[must_use]
    pub const fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = Some(ttl);
        self
    }

    /// Time-to-live left for a key, if it is live and has an expiry.
    #[must_use]
    pub fn ttl_remaining(&self, key: &str) -> Option<Duration> {
        self.store
            .read()
            .get(key)
            .filter(|entry| !entry.is_expired())
            .and_then(CacheEntry::ttl_remaining)
    }

    /// Remove expired entries (call periodically or on access)
    fn cleanup_expired(&self) {
        let mut store = self.store.write();
        store.retain(|_, entry| !entry.is_expired());
    }

    fn check_size(&self, value: &[u8]) -> CacheResult<()> {
        if value.len() > self.max_value_size {
            return Err(CacheError::ValueTooLarge {
                size: value.len(),
                max: self.max_value_size,
            });
        }
        Ok(())
    }

    fn insert_locked(&self, store: &mut HashMap<String, CacheEntry>, key: &str, entry: CacheEntry) {
        // Evict if over limit (arbitrary eviction due to HashMap iteration order)
        if let Some(max) = self.max_entries
            && store.len() >= max
            && !store.contains_key(key)
            && let Some(victim) = store.keys().next().cloned()
        {
            store.remove(&victim);
        }

        store.insert(key.to_string(), entry);
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStore for InMemoryCache {
    fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        let store = self.store.read();

        if let Some(entry) = store.get(key) {
            if entry.is_expired() {
                drop(store);
                self.stats.write().misses += 1;
                self.cleanup_expired();
                return Ok(None);
            }
            let value = entry.value.clone();
            drop(store);
            self.stats.write().hits += 1;
            Ok(Some(value))
        } else {
            drop(store);
            self.stats.write().misses += 1;
            Ok(None)
        }
    }

    fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> CacheResult<()> {
        self.check_size(value)?;

        let entry = CacheEntry::new(value, ttl.or(self.default_ttl));

        let mut store = self.store.write();
        self.insert_locked(&mut store, key, entry);
        drop(store);

        self.stats.write().sets += 1;

        Ok(())
    }

    fn delete(&self, key: &str) -> CacheResult<bool> {
        let removed = self.store.write().remove(key).is_some();

        if removed {
            self.stats.write().deletes += 1;
        }

        Ok(removed)
    }

    fn exists(&self, key: &str) -> CacheResult<bool> {
        let store = self.store.read();

        Ok(store.get(key).is_some_and(|e| !e.is_expired()))
    }

    fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        value: &[u8],
        ttl: Option<Duration>,
    ) -> CacheResult<bool> {
        self.check_size(value)?;

        let mut store = self.store.write();
        let current = store
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.value.as_slice());

        if current != expected {
            drop(store);
            self.stats.write().cas_conflicts += 1;
            return Ok(false);
        }

        let entry = CacheEntry::new(value, ttl.or(self.default_ttl));
        self.insert_locked(&mut store, key, entry);
        drop(store);

        self.stats.write().sets += 1;

        Ok(true)
    }

    fn clear(&self) -> CacheResult<()> {
        self.store.write().clear();
        Ok(())
    }

    fn stats(&self) -> CacheStats {
        let stats = self.stats.read();
        let store = self.store.read();

        let size_bytes: u64 = store
            .values()
            .filter(|e| !e.is_expired())
            .map(|e| e.value.len() as u64)
            .sum();

        let entry_count = store.values().filter(|e| !e.is_expired()).count() as u64;
        drop(store);

        CacheStats {
            hits: stats.hits,
            misses: stats.misses,
            sets: stats.sets,
            deletes: stats.deletes,
            cas_conflicts: stats.cas_conflicts,
            errors: 0,
            size_bytes: Some(size_bytes),
            entry_count: Some(entry_count),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn test_basic_set_get() {
        let cache = InMemoryCache::new();

        cache.set("q:1", b"test data", None).unwrap();
        let result = cache.get("q:1").unwrap();

        assert_eq!(result, Some(b"test data".to_vec()));
    }

    #[test]
    fn test_get_nonexistent_key() {
        let cache = InMemoryCache::new();
        assert!(cache.get("missing").unwrap().is_none());
    }

    #[test]
    fn test_delete_existing_key() {
        let cache = InMemoryCache::new();

        cache.set("q:1", b"test data", None).unwrap();
        assert!(cache.delete("q:1").unwrap());
        assert!(cache.get("q:1").unwrap().is_none());
        assert!(!cache.delete("q:1").unwrap());
    }

    #[test]
    fn test_exists() {
        let cache = InMemoryCache::new();

        assert!(!cache.exists("q:1").unwrap());
        cache.set("q:1", b"test data", None).unwrap();
        assert!(cache.exists("q:1").unwrap());
    }

    #[test]
    fn test_ttl_expiry() {
        let cache = InMemoryCache::new();

        cache
            .set("q:1", b"test data", Some(Duration::from_millis(10)))
            .unwrap();
        assert!(cache.get("q:1").unwrap().is_some());

        thread::sleep(Duration::from_millis(20));

        assert!(cache.get("q:1").unwrap().is_none());
        assert!(!cache.exists("q:1").unwrap());
    }

    #[test]
    fn test_default_ttl() {
        let cache = InMemoryCache::new().with_default_ttl(Duration::from_millis(10));

        cache.set("q:1", b"test data", None).unwrap();
        thread::sleep(Duration::from_millis(20));

        assert!(cache.get("q:1").unwrap().is_none());
    }

    #[test]
    fn test_explicit_ttl_overrides_default() {
        let cache = InMemoryCache::new().with_default_ttl(Duration::from_millis(10));

        cache
            .set("q:1", b"test data", Some(Duration::from_secs(60)))
            .unwrap();
        thread::sleep(Duration::from_millis(20));

        assert!(cache.get("q:1").unwrap().is_some());
    }

    #[test]
    fn test_unrepresentable_ttl_never_expires() {
        let cache = InMemoryCache::new().with_default_ttl(Duration::from_secs(u64::MAX));

        cache.set("q:1", b"default", None).unwrap();
        cache
            .set("q:2", b"explicit", Some(Duration::MAX))
            .unwrap();
        assert!(cache.compare_and_swap("q:3", None, b"cas", None).unwrap());

        for key in ["q:1", "q:2", "q:3"] {
            assert!(cache.get(key).unwrap().is_some());
            assert!(cache.ttl_remaining(key).is_none());
        }
    }

    #[test]
    fn test_ttl_remaining() {
        let cache = InMemoryCache::new();
        cache
            .set("q:1", b"x", Some(Duration::from_secs(60)))
            .unwrap();
        cache.set("q:2", b"x", None).unwrap();

        let left = cache.ttl_remaining("q:1").unwrap();
        assert!(left <= Duration::from_secs(60));
        assert!(left > Duration::from_secs(50));
        assert!(cache.ttl_remaining("q:2").is_none());
        assert!(cache.ttl_remaining("missing").is_none());
    }

    #[test]
    fn test_max_entries_eviction() {
        let cache = InMemoryCache::new().with_max_entries(2);

        cache.set("t1", b"data1", None).unwrap();
        cache.set("t2", b"data2", None).unwrap();
        cache.set("t3", b"data3", None).unwrap();

        assert_eq!(cache.stats().entry_count, Some(2));
        assert!(cache.get("t3").unwrap().is_some());
    }

    #[test]
    fn test_compare_and_swap_on_absent_key() {
        let cache = InMemoryCache::new();

        assert!(cache.compare_and_swap("q", None, b"v1", None).unwrap());
        assert_eq!(cache.get("q").unwrap(), Some(b"v1".to_vec()));
        // Expecting absence fails now that the key exists
        assert!(!cache.compare_and_swap("q", None, b"v2", None).unwrap());
        assert_eq!(cache.get("q").unwrap(), Some(b"v1".to_vec()));
    }

    #[test]
    fn test_compare_and_swap_detects_change() {
        let cache = InMemoryCache::new();
        cache.set("q", b"v1", None).unwrap();

        assert!(!cache.compare_and_swap("q", Some(b"old".as_slice()), b"v2", None).unwrap());
        assert!(cache.compare_and_swap("q", Some(b"v1".as_slice()), b"v2", None).unwrap());
        assert_eq!(cache.get("q").unwrap(), Some(b"v2".to_vec()));
        assert_eq!(cache.stats().cas_conflicts, 1);
    }

    #[test]
    fn test_compare_and_swap_treats_expired_as_absent() {
        let cache = InMemoryCache::new();
        cache
            .set("q", b"v1", Some(Duration::from_millis(5)))
            .unwrap();
        thread::sleep(Duration::from_millis(15));

        assert!(cache.compare_and_swap("q", None, b"v2", None).unwrap());
    }

    #[test]
    fn test_compare_and_swap_rejects_large_value() {
        let cache = InMemoryCache::new().with_max_value_size(4);
        let result = cache.compare_and_swap("q", None, b"too long", None);
        assert!(matches!(result, Err(CacheError::ValueTooLarge { .. })));
    }

    #[test]
    fn test_clear() {
        let cache = InMemoryCache::new();

        cache.set("t1", b"data1", None).unwrap();
        cache.set("t2", b"data2", None).unwrap();
        cache.clear().unwrap();

        assert_eq!(cache.stats().entry_count, Some(0));
    }

    #[test]
    fn test_stats_accuracy() {
        let cache = InMemoryCache::new();

        cache.get("q").unwrap();
        cache.set("q", b"test", None).unwrap();
        cache.get("q").unwrap();
        cache.delete("q").unwrap();

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.sets, 1);
        assert_eq!(stats.deletes, 1);
    }

    #[test]
    fn test_clone_shares_state() {
        let cache = InMemoryCache::new();
        let cache_clone = cache.clone();

        cache.set("q", b"test data", None).unwrap();

        assert_eq!(cache_clone.get("q").unwrap(), Some(b"test data".to_vec()));
    }

    #[test]
    fn test_value_too_large_rejected() {
        let cache = InMemoryCache::new().with_max_value_size(100);
        let large_value = vec![0u8; 200];

        match cache.set("q", &large_value, None).unwrap_err() {
            CacheError::ValueTooLarge { size, max } => {
                assert_eq!(size, 200);
                assert_eq!(max, 100);
            }
            e => panic!("Expected ValueTooLarge error, got: {e:?}"),
        }
    }

    #[test]
    fn test_value_at_limit_accepted() {
        let cache = InMemoryCache::new().with_max_value_size(100);
        let value = vec![0u8; 100];

        cache.set("q", &value, None).unwrap();
        assert_eq!(cache.get("q").unwrap(), Some(value));
    }

    #[test]
    fn test_default_max_value_size() {
        let cache = InMemoryCache::new();
        assert_eq!(cache.max_value_size, DEFAULT_MAX_VALUE_SIZE);
    }

    #[test]
    fn test_debug_impl() {
        let cache = InMemoryCache::new()
            .with_max_entries(100)
            .with_max_value_size(1024)
            .with_default_ttl(Duration::from_secs(60));
        let debug_str = format!("{cache:?}");
        assert!(debug_str.contains("InMemoryCache"));
        assert!(debug_str.contains("100"));
        assert!(debug_str.contains("1024"));
    }
}
