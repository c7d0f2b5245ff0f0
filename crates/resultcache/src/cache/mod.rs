//! Cache store layer
//!
//! The caching cursor persists replay buffers through the [`CacheStore`]
//! trait. Stores are opaque key-value backends with TTL support; nothing
//! beyond single-key `get`/`set` is required, and [`CacheStore::compare_and_swap`]
//! is used when a backend offers it.
//!
//! # Available Backends
//!
//! - [`NoopCache`] - No-op implementation (caching disabled)
//! - [`InMemoryCache`] - Thread-safe in-memory cache with TTL and CAS support
//!
//! # Observability
//!
//! Wrap any store with [`TracedCache`] to add tracing spans and logging.
//!
//! # Entry Layout
//!
//! One outer key holds a JSON object mapping inner keys to row sequences.
//! Each save rewrites the outer entry with the saving query's lifetime, so
//! the most recent writer decides how long every sibling entry survives.

mod config;
mod error;
mod memory;
mod noop;
mod store;
mod traced;

use std::sync::Arc;

pub use config::{CacheBackend, CacheConfig, DEFAULT_MAX_CAS_ATTEMPTS, DEFAULT_MAX_VALUE_SIZE};
pub use error::{CacheError, CacheResult};
pub use memory::InMemoryCache;
pub use noop::NoopCache;
pub use store::{CacheStats, CacheStore};
pub use traced::TracedCache;

/// Create a cache store based on configuration
#[must_use]
pub fn create_cache(config: &CacheConfig) -> Arc<dyn CacheStore> {
    if !config.enabled {
        return Arc::new(NoopCache::new());
    }

    match config.backend {
        CacheBackend::Noop => Arc::new(NoopCache::new()),
        CacheBackend::Memory => {
            let mut cache = InMemoryCache::new().with_max_value_size(config.max_value_size);

            if let Some(ttl) = config.default_ttl {
                cache = cache.with_default_ttl(ttl);
            }

            if let Some(max) = config.max_entries {
                cache = cache.with_max_entries(max);
            }

            Arc::new(TracedCache::new(cache, env!("CARGO_PKG_NAME")))
        }
    }
}
