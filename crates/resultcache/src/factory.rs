//! Cache-aware cursor factory.
//!
//! Looks a query up before executing it. A hit yields a [`ReplayCursor`]
//! over the cached rows and the live query never runs; a miss executes the
//! query and wraps the live cursor in a [`CachingCursor`] so the result is
//! stored once it has been read to the end.

use std::sync::Arc;

use crate::cache::{CacheConfig, CacheStore, create_cache};
use crate::caching::CachingCursor;
use crate::cursor::{MutationCursor, ReplayCursor, ResultCursor};
use crate::error::{CursorError, Result};
use crate::profile::{CacheKeys, QueryCacheProfile};
use crate::shape::{FetchShape, ShapedRow};
use crate::value::Row;
use crate::writer::decode_entry;

/// Cursor returned by [`execute_cached`]: replayed from cache or live.
#[derive(Debug)]
pub enum QueryCursor<'s, C, S: ?Sized> {
    Cached(ReplayCursor),
    Live(CachingCursor<'s, C, S>),
}

impl<C: ResultCursor, S: CacheStore + ?Sized> QueryCursor<'_, C, S> {
    pub const fn is_cached(&self) -> bool {
        matches!(self, Self::Cached(_))
    }

    pub fn column_count(&self) -> usize {
        match self {
            Self::Cached(cursor) => cursor.column_count(),
            Self::Live(cursor) => cursor.column_count(),
        }
    }

    pub fn fetch_step(&mut self, shape: FetchShape) -> Result<Option<ShapedRow>> {
        match self {
            Self::Cached(cursor) => cursor
                .fetch_row()?
                .map(|row| shape.project_owned(row))
                .transpose(),
            Self::Live(cursor) => cursor.fetch_step(shape),
        }
    }

    pub fn fetch_all(&mut self, shape: FetchShape) -> Result<Vec<ShapedRow>> {
        match self {
            Self::Cached(cursor) => {
                let mut rows = Vec::with_capacity(cursor.remaining());
                while let Some(row) = cursor.fetch_row()? {
                    rows.push(shape.project_owned(row)?);
                }
                Ok(rows)
            }
            Self::Live(cursor) => cursor.fetch_all(shape),
        }
    }

    pub fn try_rows_affected(&self) -> Result<u64> {
        match self {
            Self::Cached(_) => Err(CursorError::capability(
                "rows_affected is not available on a cached result",
            )),
            Self::Live(cursor) => cursor.try_rows_affected(),
        }
    }

    pub fn close(&mut self) {
        match self {
            Self::Cached(cursor) => cursor.close(),
            Self::Live(cursor) => cursor.close(),
        }
    }
}

impl<C: ResultCursor, S: CacheStore + ?Sized> ResultCursor for QueryCursor<'_, C, S> {
    fn column_count(&self) -> usize {
        Self::column_count(self)
    }

    fn fetch_row(&mut self) -> Result<Option<Row>> {
        match self {
            Self::Cached(cursor) => cursor.fetch_row(),
            Self::Live(cursor) => ResultCursor::fetch_row(cursor),
        }
    }

    fn close(&mut self) {
        Self::close(self);
    }

    fn as_mutation(&self) -> Option<&dyn MutationCursor> {
        match self {
            Self::Cached(_) => None,
            Self::Live(cursor) => cursor.as_mutation(),
        }
    }
}

/// Rows cached for `keys`, if the outer entry holds the inner key.
///
/// Unreadable or undecodable entries count as a miss. An outer entry that
/// exists without this inner key is a miss too: the query must run again.
pub fn lookup<S: CacheStore + ?Sized>(store: &S, keys: &CacheKeys) -> Option<Vec<Row>> {
    let bytes = match store.get(&keys.outer) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(cache.operation = "get", error = %e, "cache lookup failed");
            return None;
        }
    };

    match decode_entry(&bytes) {
        Ok(mut entry) => {
            let rows = entry.remove(&keys.inner);
            if rows.is_none() {
                tracing::debug!(
                    cache.key = %keys.outer,
                    cache.inner_key = %keys.inner,
                    "outer entry present without inner key"
                );
            }
            rows
        }
        Err(e) => {
            tracing::warn!(cache.operation = "decode", error = %e, "cache lookup failed");
            None
        }
    }
}

/// Serve a query from cache, or run `execute` and cache its result.
pub fn execute_cached<'s, C, S, F>(
    store: &'s S,
    profile: &QueryCacheProfile,
    keys: CacheKeys,
    execute: F,
) -> Result<QueryCursor<'s, C, S>>
where
    C: ResultCursor,
    S: CacheStore + ?Sized,
    F: FnOnce() -> Result<C>,
{
    if let Some(rows) = lookup(store, &keys) {
        tracing::debug!(
            cache.key = %keys.outer,
            cache.inner_key = %keys.inner,
            cache.rows = rows.len(),
            "serving result from cache"
        );
        return Ok(QueryCursor::Cached(ReplayCursor::new(rows)));
    }

    let cursor = execute()?;
    Ok(QueryCursor::Live(CachingCursor::with_keys(
        cursor, store, profile, keys,
    )))
}

/// Store and merge policy built from [`CacheConfig`].
#[derive(Clone)]
pub struct CachedExecutor {
    store: Arc<dyn CacheStore>,
    max_cas_attempts: u32,
}

impl std::fmt::Debug for CachedExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedExecutor")
            .field("max_cas_attempts", &self.max_cas_attempts)
            .finish_non_exhaustive()
    }
}

impl CachedExecutor {
    pub fn new(store: Arc<dyn CacheStore>, max_cas_attempts: u32) -> Self {
        Self {
            store,
            max_cas_attempts,
        }
    }

    #[must_use]
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(create_cache(config), config.max_cas_attempts)
    }

    pub fn store(&self) -> &dyn CacheStore {
        self.store.as_ref()
    }

    /// [`execute_cached`] against this executor's store.
    pub fn execute<C, F>(
        &self,
        profile: &QueryCacheProfile,
        keys: CacheKeys,
        execute: F,
    ) -> Result<QueryCursor<'_, C, dyn CacheStore>>
    where
        C: ResultCursor,
        F: FnOnce() -> Result<C>,
    {
        let cursor = execute_cached(self.store.as_ref(), profile, keys, execute)?;
        Ok(match cursor {
            QueryCursor::Live(live) => {
                QueryCursor::Live(live.with_max_cas_attempts(self.max_cas_attempts))
            }
            cached @ QueryCursor::Cached(_) => cached,
        })
    }
}
