//! Cache writer: persists a sealed replay buffer under the two-level key.
//!
//! The outer key names one cache slot whose value is a JSON object mapping
//! inner keys to row sequences. Saving is a read-modify-write:
//!
//! 1. read the outer entry (missing, failing or undecodable reads count as
//!    an empty mapping);
//! 2. insert this query's rows under its inner key;
//! 3. write the mapping back with this query's lifetime.
//!
//! Stores that support [`CacheStore::compare_and_swap`] get an optimistic
//! merge loop, so concurrent writers sharing an outer key keep each other's
//! entries. Other stores fall back to last-write-wins, where two writers
//! racing on one outer key can lose one inner entry.
//!
//! Store failures never reach the caller; they degrade to "not cached".

use std::collections::HashMap;
use std::time::Duration;

use crate::cache::{CacheError, CacheResult, CacheStore, DEFAULT_MAX_CAS_ATTEMPTS};
use crate::value::Row;

/// Decoded outer cache entry: inner key to buffered rows.
pub type OuterEntry = HashMap<String, Vec<Row>>;

/// Outcome of one save, reported for observability only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Written unconditionally (store without compare-and-swap, or retries exhausted).
    Saved,
    /// Written through compare-and-swap after `attempts` tries.
    Merged { attempts: u32 },
    /// Store rejected the write; the result is not cached.
    Failed,
}

impl SaveOutcome {
    #[must_use]
    pub const fn is_persisted(&self) -> bool {
        !matches!(self, Self::Failed)
    }
}

/// Decode an outer entry read from the store.
pub fn decode_entry(bytes: &[u8]) -> CacheResult<OuterEntry> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Encode an outer entry for the store.
pub fn encode_entry(entry: &OuterEntry) -> CacheResult<Vec<u8>> {
    serde_json::to_vec(entry).map_err(|e| CacheError::Serialization(e.to_string()))
}

/// Convert a lifetime in seconds to a store TTL; `0` means store default.
#[must_use]
pub fn lifetime_to_ttl(lifetime: u32) -> Option<Duration> {
    (lifetime > 0).then(|| Duration::from_secs(u64::from(lifetime)))
}

/// Writes one query's rows into its outer cache entry.
pub struct CacheWriter<'s, S: ?Sized> {
    store: &'s S,
    cache_key: String,
    real_key: String,
    lifetime: u32,
    max_cas_attempts: u32,
}

impl<S: ?Sized> std::fmt::Debug for CacheWriter<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheWriter")
            .field("cache_key", &self.cache_key)
            .field("real_key", &self.real_key)
            .field("lifetime", &self.lifetime)
            .field("max_cas_attempts", &self.max_cas_attempts)
            .finish_non_exhaustive()
    }
}

impl<'s, S: CacheStore + ?Sized> CacheWriter<'s, S> {
    pub fn new(
        store: &'s S,
        cache_key: impl Into<String>,
        real_key: impl Into<String>,
        lifetime: u32,
    ) -> Self {
        Self {
            store,
            cache_key: cache_key.into(),
            real_key: real_key.into(),
            lifetime,
            max_cas_attempts: DEFAULT_MAX_CAS_ATTEMPTS,
        }
    }

    #[must_use]
    pub const fn with_max_cas_attempts(mut self, attempts: u32) -> Self {
        self.max_cas_attempts = attempts;
        self
    }

    pub fn cache_key(&self) -> &str {
        &self.cache_key
    }

    pub fn real_key(&self) -> &str {
        &self.real_key
    }

    pub const fn lifetime(&self) -> u32 {
        self.lifetime
    }

    pub const fn store(&self) -> &'s S {
        self.store
    }

    /// Persist `rows` under the inner key. Never fails; see [`SaveOutcome`].
    pub fn save(&self, rows: &[Row]) -> SaveOutcome {
        let ttl = lifetime_to_ttl(self.lifetime);

        let mut attempts = 0;
        while attempts < self.max_cas_attempts {
            attempts += 1;
            let (current, mut entry) = self.read_current();
            entry.insert(self.real_key.clone(), rows.to_vec());
            let Some(encoded) = self.encode(&entry) else {
                return SaveOutcome::Failed;
            };

            match self
                .store
                .compare_and_swap(&self.cache_key, current.as_deref(), &encoded, ttl)
            {
                Ok(true) => {
                    tracing::debug!(
                        cache.key = %self.cache_key,
                        cache.inner_key = %self.real_key,
                        cache.rows = rows.len(),
                        cache.ttl_secs = self.lifetime,
                        cache.attempts = attempts,
                        "result set merged into cache"
                    );
                    return SaveOutcome::Merged { attempts };
                }
                Ok(false) => {
                    tracing::debug!(
                        cache.key = %self.cache_key,
                        cache.attempts = attempts,
                        "outer cache entry changed during save, retrying"
                    );
                }
                Err(e) if e.is_unsupported() => break,
                Err(e) => {
                    tracing::warn!(
                        cache.operation = "compare_and_swap",
                        error = %e,
                        "falling back to unconditional cache write"
                    );
                    break;
                }
            }
        }

        self.save_unconditionally(rows, ttl)
    }

    /// Last-write-wins save used when compare-and-swap is unavailable.
    fn save_unconditionally(&self, rows: &[Row], ttl: Option<Duration>) -> SaveOutcome {
        let (_, mut entry) = self.read_current();
        entry.insert(self.real_key.clone(), rows.to_vec());
        let Some(encoded) = self.encode(&entry) else {
            return SaveOutcome::Failed;
        };

        match self.store.set(&self.cache_key, &encoded, ttl) {
            Ok(()) => {
                tracing::debug!(
                    cache.key = %self.cache_key,
                    cache.inner_key = %self.real_key,
                    cache.rows = rows.len(),
                    cache.ttl_secs = self.lifetime,
                    "result set saved to cache"
                );
                SaveOutcome::Saved
            }
            Err(e) => {
                tracing::warn!(
                    cache.operation = "set",
                    error = %e,
                    "result set not cached"
                );
                SaveOutcome::Failed
            }
        }
    }

    /// Raw bytes currently stored (for compare-and-swap) and their decoded form.
    fn read_current(&self) -> (Option<Vec<u8>>, OuterEntry) {
        match self.store.get(&self.cache_key) {
            Ok(Some(bytes)) => match decode_entry(&bytes) {
                Ok(entry) => (Some(bytes), entry),
                Err(e) => {
                    tracing::warn!(
                        cache.operation = "decode",
                        error = %e,
                        "discarding undecodable outer cache entry"
                    );
                    (Some(bytes), OuterEntry::new())
                }
            },
            Ok(None) => (None, OuterEntry::new()),
            Err(e) => {
                tracing::warn!(
                    cache.operation = "get",
                    error = %e,
                    "outer cache entry unreadable, treating as empty"
                );
                (None, OuterEntry::new())
            }
        }
    }

    fn encode(&self, entry: &OuterEntry) -> Option<Vec<u8>> {
        match encode_entry(entry) {
            Ok(encoded) => Some(encoded),
            Err(e) => {
                tracing::warn!(
                    cache.operation = "encode",
                    cache.key = %self.cache_key,
                    error = %e,
                    "result set not cached"
                );
                None
            }
        }
    }
}
