//! Traced cache wrapper for observability

use std::time::Duration;

use super::error::CacheResult;
use super::store::{CacheStats, CacheStore};

/// Wrapper that adds tracing to any `CacheStore`
///
/// Uses debug-level spans to avoid exposing cache keys in production logs.
/// Cache keys embed query text and bound parameters.
pub struct TracedCache<C> {
    inner: C,
    service_name: String,
}

impl<C: std::fmt::Debug> std::fmt::Debug for TracedCache<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TracedCache")
            .field("inner", &self.inner)
            .field("service_name", &self.service_name)
            .finish()
    }
}

impl<C: Clone> Clone for TracedCache<C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            service_name: self.service_name.clone(),
        }
    }
}

impl<C> TracedCache<C> {
    pub fn new(cache: C, service_name: impl Into<String>) -> Self {
        Self {
            inner: cache,
            service_name: service_name.into(),
        }
    }

    pub const fn inner(&self) -> &C {
        &self.inner
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }
}

impl<C: CacheStore> CacheStore for TracedCache<C> {
    fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        let span = tracing::debug_span!(
            "cache.get",
            cache.key = key,
            cache.service = %self.service_name,
        );
        let _enter = span.enter();

        let result = self.inner.get(key);

        match &result {
            Ok(Some(data)) => {
                tracing::debug!(cache.result = "hit", cache.size_bytes = data.len());
            }
            Ok(None) => {
                tracing::debug!(cache.result = "miss");
            }
            Err(e) => {
                tracing::warn!(cache.result = "error", error = %e);
            }
        }

        result
    }

    fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> CacheResult<()> {
        let span = tracing::debug_span!(
            "cache.set",
            cache.key = key,
            cache.service = %self.service_name,
            cache.value_size = value.len(),
            cache.ttl_secs = ttl.map(|d| d.as_secs()),
        );
        let _enter = span.enter();

        let result = self.inner.set(key, value, ttl);

        if let Err(ref e) = result {
            tracing::warn!(cache.operation = "set", error = %e);
        }

        result
    }

    fn delete(&self, key: &str) -> CacheResult<bool> {
        let span = tracing::debug_span!(
            "cache.delete",
            cache.key = key,
            cache.service = %self.service_name,
        );
        let _enter = span.enter();

        let result = self.inner.delete(key);

        match &result {
            Ok(deleted) => {
                tracing::debug!(cache.operation = "delete", cache.deleted = deleted);
            }
            Err(e) => {
                tracing::warn!(cache.operation = "delete", error = %e);
            }
        }

        result
    }

    fn exists(&self, key: &str) -> CacheResult<bool> {
        let span = tracing::debug_span!(
            "cache.exists",
            cache.key = key,
            cache.service = %self.service_name,
        );
        let _enter = span.enter();

        self.inner.exists(key)
    }

    fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        value: &[u8],
        ttl: Option<Duration>,
    ) -> CacheResult<bool> {
        let span = tracing::debug_span!(
            "cache.compare_and_swap",
            cache.key = key,
            cache.service = %self.service_name,
            cache.value_size = value.len(),
            cache.ttl_secs = ttl.map(|d| d.as_secs()),
        );
        let _enter = span.enter();

        let result = self.inner.compare_and_swap(key, expected, value, ttl);

        match &result {
            Ok(true) => tracing::debug!(cache.operation = "cas", cache.swapped = true),
            Ok(false) => tracing::debug!(cache.operation = "cas", cache.swapped = false),
            Err(e) if e.is_unsupported() => {}
            Err(e) => tracing::warn!(cache.operation = "cas", error = %e),
        }

        result
    }

    fn clear(&self) -> CacheResult<()> {
        let span = tracing::debug_span!("cache.clear", cache.service = %self.service_name);
        let _enter = span.enter();

        let result = self.inner.clear();

        if let Err(ref e) = result {
            tracing::warn!(cache.operation = "clear", error = %e);
        } else {
            tracing::debug!(cache.operation = "clear");
        }

        result
    }

    fn stats(&self) -> CacheStats {
        self.inner.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::super::memory::InMemoryCache;
    use super::super::noop::NoopCache;
    use super::*;

    #[test]
    fn test_traced_cache_get_miss() {
        let traced = TracedCache::new(NoopCache::new(), "test-service");
        assert!(traced.get("q").unwrap().is_none());
    }

    #[test]
    fn test_traced_cache_set_and_get_hit() {
        let traced = TracedCache::new(InMemoryCache::new(), "test-service");

        traced
            .set("q", b"test data", Some(Duration::from_secs(60)))
            .unwrap();
        assert_eq!(traced.get("q").unwrap(), Some(b"test data".to_vec()));
    }

    #[test]
    fn test_traced_cache_delete() {
        let traced = TracedCache::new(NoopCache::new(), "test-service");
        assert!(!traced.delete("q").unwrap());
    }

    #[test]
    fn test_traced_cache_exists() {
        let traced = TracedCache::new(NoopCache::new(), "test-service");
        assert!(!traced.exists("q").unwrap());
    }

    #[test]
    fn test_traced_cache_forwards_compare_and_swap() {
        let traced = TracedCache::new(InMemoryCache::new(), "test-service");
        assert!(traced.compare_and_swap("q", None, b"v1", None).unwrap());
        assert!(!traced.compare_and_swap("q", None, b"v2", None).unwrap());
    }

    #[test]
    fn test_traced_cache_clear() {
        let traced = TracedCache::new(NoopCache::new(), "test-service");
        assert!(traced.clear().is_ok());
    }

    #[test]
    fn test_traced_cache_stats() {
        let traced = TracedCache::new(NoopCache::new(), "test-service");
        traced.get("q").unwrap();
        assert_eq!(traced.stats().misses, 1);
    }

    #[test]
    fn test_traced_cache_clone() {
        let traced = TracedCache::new(InMemoryCache::new(), "test-service");
        let cloned = traced.clone();

        traced.set("q", b"v", None).unwrap();
        assert!(cloned.get("q").unwrap().is_some());
        assert_eq!(cloned.service_name(), "test-service");
    }

    #[test]
    fn test_traced_cache_debug() {
        let traced = TracedCache::new(NoopCache::new(), "test-service");
        let debug_str = format!("{traced:?}");
        assert!(debug_str.contains("TracedCache"));
        assert!(debug_str.contains("test-service"));
    }
}
