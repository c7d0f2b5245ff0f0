//! No-op cache store

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use super::error::CacheResult;
use super::store::{CacheStats, CacheStore};

/// Cache store that never stores
///
/// Used when caching is disabled: every lookup misses, so every query runs
/// against the live cursor, and every save is silently dropped.
#[derive(Debug, Clone, Default)]
pub struct NoopCache {
    misses: Arc<AtomicU64>,
}

impl NoopCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for NoopCache {
    fn get(&self, _key: &str) -> CacheResult<Option<Vec<u8>>> {
        self.misses.fetch_add(1, Ordering::Relaxed);
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &[u8], _ttl: Option<Duration>) -> CacheResult<()> {
        Ok(())
    }

    fn delete(&self, _key: &str) -> CacheResult<bool> {
        Ok(false)
    }

    fn exists(&self, _key: &str) -> CacheResult<bool> {
        Ok(false)
    }

    fn compare_and_swap(
        &self,
        _key: &str,
        _expected: Option<&[u8]>,
        _value: &[u8],
        _ttl: Option<Duration>,
    ) -> CacheResult<bool> {
        Ok(true)
    }

    fn clear(&self) -> CacheResult<()> {
        Ok(())
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            misses: self.misses.load(Ordering::Relaxed),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_get_always_none() {
        let cache = NoopCache::new();
        cache.set("q", b"test data", None).unwrap();
        assert!(cache.get("q").unwrap().is_none());
    }

    #[test]
    fn test_noop_set_succeeds() {
        let cache = NoopCache::new();
        let result = cache.set("q", b"test data", Some(Duration::from_secs(60)));
        assert!(result.is_ok());
    }

    #[test]
    fn test_noop_delete_and_exists() {
        let cache = NoopCache::new();
        assert!(!cache.delete("q").unwrap());
        assert!(!cache.exists("q").unwrap());
    }

    #[test]
    fn test_noop_compare_and_swap_accepts() {
        let cache = NoopCache::new();
        assert!(cache.compare_and_swap("q", None, b"v", None).unwrap());
        assert!(cache.get("q").unwrap().is_none());
    }

    #[test]
    fn test_noop_clear_succeeds() {
        assert!(NoopCache::new().clear().is_ok());
    }

    #[test]
    fn test_noop_stats_tracks_misses() {
        let cache = NoopCache::new();

        cache.get("q").unwrap();
        cache.get("q").unwrap();
        cache.get("q").unwrap();

        let stats = cache.stats();
        assert_eq!(stats.misses, 3);
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.sets, 0);
    }

    #[test]
    fn test_noop_clone_shares_stats() {
        let cache = NoopCache::new();
        let cache_clone = cache.clone();

        cache.get("q").unwrap();
        cache_clone.get("q").unwrap();

        assert_eq!(cache.stats().misses, 2);
    }
}
