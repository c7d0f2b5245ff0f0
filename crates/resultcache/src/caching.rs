//! Caching decorator over a live forward-only cursor.
//!
//! [`CachingCursor`] hands each row to the caller in the requested
//! [`FetchShape`] and appends the associative form to its [`ReplayBuffer`].
//! When the live cursor reports end-of-data, or a bulk fetch completes, the
//! buffer is sealed and persisted once through the [`CacheWriter`].
//!
//! ```text
//! caller ──fetch_step──> CachingCursor ──fetch_row──> live cursor
//!                             │
//!                             ├─ push ──> ReplayBuffer
//!                             └─ end-of-data ──seal──> CacheWriter ──> CacheStore
//! ```

use std::fmt;

use crate::buffer::{BufferState, ReplayBuffer};
use crate::cache::CacheStore;
use crate::cursor::{MutationCursor, ResultCursor};
use crate::error::{CursorError, Result};
use crate::profile::{CacheKeys, QueryCacheProfile};
use crate::shape::{FetchShape, ShapedRow};
use crate::value::{Row, Value};
use crate::writer::{CacheWriter, SaveOutcome};

/// Transparent caching wrapper around a live [`ResultCursor`].
///
/// Owns the replay buffer for one query execution. The store is borrowed;
/// a cursor can be borrowed too, since `&mut C` is itself a cursor.
pub struct CachingCursor<'s, C, S: ?Sized> {
    cursor: C,
    writer: CacheWriter<'s, S>,
    buffer: ReplayBuffer,
    shape: FetchShape,
    last_save: Option<SaveOutcome>,
}

impl<C, S: ?Sized> fmt::Debug for CachingCursor<'_, C, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachingCursor")
            .field("writer", &self.writer)
            .field("state", &self.buffer.state())
            .field("buffered", &self.buffer.len())
            .field("shape", &self.shape)
            .field("last_save", &self.last_save)
            .finish_non_exhaustive()
    }
}

impl<'s, C: ResultCursor, S: CacheStore + ?Sized> CachingCursor<'s, C, S> {
    /// Wrap `cursor`, caching its rows under `cache_key` / `real_key`.
    ///
    /// `lifetime` is in seconds; `0` leaves expiry to the store.
    pub fn new(
        cursor: C,
        store: &'s S,
        cache_key: impl Into<String>,
        real_key: impl Into<String>,
        lifetime: u32,
    ) -> Self {
        Self {
            cursor,
            writer: CacheWriter::new(store, cache_key, real_key, lifetime),
            buffer: ReplayBuffer::new(),
            shape: FetchShape::default(),
            last_save: None,
        }
    }

    /// Wrap `cursor` using keys produced by [`QueryCacheProfile::generate_cache_keys`].
    pub fn with_keys(
        cursor: C,
        store: &'s S,
        profile: &QueryCacheProfile,
        keys: CacheKeys,
    ) -> Self {
        Self::new(cursor, store, keys.outer, keys.inner, profile.lifetime)
    }

    #[must_use]
    pub fn with_max_cas_attempts(mut self, attempts: u32) -> Self {
        self.writer = self.writer.with_max_cas_attempts(attempts);
        self
    }

    pub fn cache_key(&self) -> &str {
        self.writer.cache_key()
    }

    pub fn real_key(&self) -> &str {
        self.writer.real_key()
    }

    pub const fn state(&self) -> BufferState {
        self.buffer.state()
    }

    /// Outcome of the save triggered by sealing, once it has happened.
    pub const fn last_save(&self) -> Option<SaveOutcome> {
        self.last_save
    }

    /// Rows buffered so far, in fetch order.
    pub fn buffered_rows(&self) -> Option<&[Row]> {
        self.buffer.rows()
    }

    pub const fn fetch_shape(&self) -> FetchShape {
        self.shape
    }

    /// Default shape used by [`Self::fetch`].
    pub const fn set_fetch_shape(&mut self, shape: FetchShape) {
        self.shape = shape;
    }

    pub fn column_count(&self) -> usize {
        self.cursor.column_count()
    }

    /// Affected-row count, for sources that may not report one.
    pub fn try_rows_affected(&self) -> Result<u64> {
        self.cursor
            .as_mutation()
            .map(MutationCursor::rows_affected)
            .ok_or_else(|| {
                CursorError::capability("rows_affected requires a mutation-capable statement")
            })
    }

    /// Fetch the next row in the default shape.
    pub fn fetch(&mut self) -> Result<Option<ShapedRow>> {
        self.fetch_step(self.shape)
    }

    /// Fetch the next row in the shape named by `tag`.
    ///
    /// An unknown tag fails before the live cursor is touched.
    pub fn fetch_shape_tag(&mut self, tag: &str) -> Result<Option<ShapedRow>> {
        let shape = tag.parse::<FetchShape>()?;
        self.fetch_step(shape)
    }

    /// Fetch the next row from the live cursor, projected into `shape`.
    ///
    /// `Ok(None)` signals end-of-data. The first end-of-data seals the
    /// buffer and saves it; every later call returns `Ok(None)` without
    /// touching the cursor or the store.
    pub fn fetch_step(&mut self, shape: FetchShape) -> Result<Option<ShapedRow>> {
        self.next_row(|row| shape.project(row))
    }

    /// Fetch the value at `index` of the next row.
    pub fn fetch_column(&mut self, index: usize) -> Result<Option<Value>> {
        self.next_row(|row| {
            row.value(index).cloned().ok_or_else(|| {
                CursorError::no_data(format!(
                    "column index {index} out of range for {} columns",
                    row.len()
                ))
            })
        })
    }

    /// Drain the live cursor, seal, save and return every row in `shape`.
    ///
    /// Rows buffered by earlier step fetches are superseded by the drain.
    /// On a sealed or closed buffer this returns no rows and saves nothing.
    pub fn fetch_all(&mut self, shape: FetchShape) -> Result<Vec<ShapedRow>> {
        if self.buffer.state().is_finished() {
            return Ok(Vec::new());
        }

        let mut rows = Vec::new();
        loop {
            match self.cursor.fetch_row() {
                Ok(Some(row)) => rows.push(row),
                Ok(None) => break,
                Err(e) => {
                    // Keep the partial drain; failure is not exhaustion
                    self.buffer.replace(rows);
                    return Err(e);
                }
            }
        }

        let superseded = self.buffer.replace(rows);
        if superseded > 0 {
            tracing::warn!(
                cache.superseded = superseded,
                "bulk fetch replaced rows buffered by earlier step fetches"
            );
        }
        self.seal_and_save();

        self.buffer
            .rows()
            .unwrap_or_default()
            .iter()
            .map(|row| shape.project(row))
            .collect()
    }

    /// Iteration-style accessor over the whole result.
    ///
    /// Re-reads a sealed buffer without touching the live cursor; otherwise
    /// behaves as [`Self::fetch_all`].
    pub fn replay(&mut self, shape: FetchShape) -> Result<Vec<ShapedRow>> {
        match self.buffer.state() {
            BufferState::Sealed => self
                .buffer
                .rows()
                .unwrap_or_default()
                .iter()
                .map(|row| shape.project(row))
                .collect(),
            BufferState::Closed => Ok(Vec::new()),
            BufferState::Unstarted | BufferState::Accumulating => self.fetch_all(shape),
        }
    }

    /// Release the live cursor and discard the buffer without saving.
    pub fn close(&mut self) {
        if self.buffer.state() == BufferState::Accumulating {
            tracing::debug!(
                cache.inner_key = %self.writer.real_key(),
                cache.rows = self.buffer.len(),
                "cursor closed before exhaustion, discarding partial result"
            );
        }
        self.cursor.close();
        self.buffer.close();
    }

    fn next_row<T>(&mut self, project: impl FnOnce(&Row) -> Result<T>) -> Result<Option<T>> {
        if self.buffer.state().is_finished() {
            return Ok(None);
        }
        self.buffer.begin();

        if let Some(row) = self.cursor.fetch_row()? {
            let projected = project(&row);
            self.buffer.push(row);
            projected.map(Some)
        } else {
            self.seal_and_save();
            Ok(None)
        }
    }

    fn seal_and_save(&mut self) {
        if let Some(rows) = self.buffer.seal() {
            tracing::debug!(
                cache.key = %self.writer.cache_key(),
                cache.inner_key = %self.writer.real_key(),
                cache.rows = rows.len(),
                "replay buffer sealed"
            );
            self.last_save = Some(self.writer.save(rows));
        }
    }
}

impl<C: MutationCursor, S: CacheStore + ?Sized> CachingCursor<'_, C, S> {
    /// Affected-row count of the wrapped statement.
    pub fn rows_affected(&self) -> u64 {
        self.cursor.rows_affected()
    }
}

impl<C: ResultCursor, S: CacheStore + ?Sized> ResultCursor for CachingCursor<'_, C, S> {
    fn column_count(&self) -> usize {
        self.cursor.column_count()
    }

    fn fetch_row(&mut self) -> Result<Option<Row>> {
        Ok(self
            .fetch_step(FetchShape::Associative)?
            .and_then(ShapedRow::into_associative))
    }

    fn close(&mut self) {
        Self::close(self);
    }

    fn as_mutation(&self) -> Option<&dyn MutationCursor> {
        self.cursor.as_mutation()
    }
}
