//! Transparent result-set caching for forward-only database cursors.
//!
//! A [`CachingCursor`] sits in front of a live [`ResultCursor`]. Every row
//! the caller reads is buffered; once the cursor is exhausted the buffered
//! result is stored in a [`CacheStore`] under a two-level key, so the next
//! identical query can be served by [`execute_cached`] without touching the
//! database.
//!
//! # Example
//!
//! ```rust
//! use resultcache::{
//!     CacheKeys, FetchShape, InMemoryCache, QueryCacheProfile, ReplayCursor, Row, Value,
//!     execute_cached,
//! };
//!
//! let cache = InMemoryCache::new();
//! let profile = QueryCacheProfile::new().with_lifetime(60);
//! let rows = vec![Row::from_pairs([("id", Value::from(1))])];
//!
//! let mut live = execute_cached(&cache, &profile, CacheKeys::new("Q", "Q#p1"), || {
//!     Ok(ReplayCursor::new(rows.clone()))
//! })?;
//! assert!(!live.is_cached());
//! live.fetch_all(FetchShape::Associative)?;
//!
//! let hit = execute_cached(&cache, &profile, CacheKeys::new("Q", "Q#p1"), || {
//!     Ok(ReplayCursor::new(Vec::new()))
//! })?;
//! assert!(hit.is_cached());
//! # Ok::<(), resultcache::CursorError>(())
//! ```

mod buffer;
pub mod cache;
mod caching;
pub mod config;
mod cursor;
mod error;
mod factory;
pub mod observability;
mod profile;
pub mod schema_sync;
mod shape;
mod value;
mod writer;

pub use buffer::{BufferState, ReplayBuffer};
pub use cache::{
    CacheBackend, CacheConfig, CacheError, CacheResult, CacheStats, CacheStore, InMemoryCache,
    NoopCache, TracedCache, create_cache,
};
pub use caching::CachingCursor;
pub use config::{LogConfig, Settings, load_settings, load_settings_from_path};
pub use cursor::{MutationCursor, ReplayCursor, ResultCursor};
pub use error::{CursorError, Error, Result};
pub use factory::{CachedExecutor, QueryCursor, execute_cached, lookup};
pub use profile::{CacheKeys, QueryCacheProfile};
pub use schema_sync::{SchemaSyncError, SchemaSynchronizer, StatementExecutor, SyncReport};
pub use shape::{FetchShape, MixedRow, ShapedRow};
pub use value::{Row, Value};
pub use writer::{CacheWriter, OuterEntry, SaveOutcome, decode_entry, encode_entry};
