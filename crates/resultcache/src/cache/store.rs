//! Cache store trait definition

use std::sync::Arc;
use std::time::Duration;

use super::error::{CacheError, CacheResult};

/// Cache statistics for observability
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub deletes: u64,
    pub cas_conflicts: u64,
    pub errors: u64,
    pub size_bytes: Option<u64>,
    pub entry_count: Option<u64>,
}

/// Key-value cache store used to persist replayed result sets.
///
/// Operations are synchronous; no atomicity is assumed beyond what
/// [`CacheStore::compare_and_swap`] explicitly offers.
pub trait CacheStore: Send + Sync {
    /// Get a value by key. Expired entries read as `None`.
    fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>>;

    /// Set a value with optional TTL (`None` means backend default).
    fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> CacheResult<()>;

    /// Delete a key, returning whether it existed.
    fn delete(&self, key: &str) -> CacheResult<bool>;

    /// Check if a live entry exists.
    fn exists(&self, key: &str) -> CacheResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Write `value` only if the current content equals `expected`
    /// (`None` meaning "absent").
    ///
    /// Returns `Ok(false)` when the entry changed concurrently. Backends
    /// without an atomic primitive return [`CacheError::Unsupported`].
    fn compare_and_swap(
        &self,
        _key: &str,
        _expected: Option<&[u8]>,
        _value: &[u8],
        _ttl: Option<Duration>,
    ) -> CacheResult<bool> {
        Err(CacheError::Unsupported("compare_and_swap"))
    }

    /// Clear entire cache (use with caution)
    fn clear(&self) -> CacheResult<()>;

    /// Get cache statistics for observability
    fn stats(&self) -> CacheStats;
}

macro_rules! forward_cache_store {
    ($($ty:ty),+) => {$(
        impl<T: CacheStore + ?Sized> CacheStore for $ty {
            fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
                (**self).get(key)
            }

            fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> CacheResult<()> {
                (**self).set(key, value, ttl)
            }

            fn delete(&self, key: &str) -> CacheResult<bool> {
                (**self).delete(key)
            }

            fn exists(&self, key: &str) -> CacheResult<bool> {
                (**self).exists(key)
            }

            fn compare_and_swap(
                &self,
                key: &str,
                expected: Option<&[u8]>,
                value: &[u8],
                ttl: Option<Duration>,
            ) -> CacheResult<bool> {
                (**self).compare_and_swap(key, expected, value, ttl)
            }

            fn clear(&self) -> CacheResult<()> {
                (**self).clear()
            }

            fn stats(&self) -> CacheStats {
                (**self).stats()
            }
        }
    )+};
}

forward_cache_store!(&T, Arc<T>, Box<T>);
