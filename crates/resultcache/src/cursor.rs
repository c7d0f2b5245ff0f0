//! Cursor contracts consumed by the caching decorator.
//!
//! A [`ResultCursor`] is forward-only: rows come out once, in order, until
//! `fetch_row` reports end-of-data with `Ok(None)`. Sources that can also
//! report an affected-row count implement [`MutationCursor`].

use crate::error::Result;
use crate::value::Row;

/// Forward-only source of rows.
pub trait ResultCursor {
    /// Number of columns in the result; stable for the query's lifetime.
    fn column_count(&self) -> usize;

    /// Pull the next row, or `Ok(None)` once the result is exhausted.
    fn fetch_row(&mut self) -> Result<Option<Row>>;

    /// Release the cursor. Further fetches return end-of-data.
    fn close(&mut self);

    /// Mutation capability of this source, if any.
    ///
    /// Type-erased cursors use this to expose [`MutationCursor`] at runtime.
    fn as_mutation(&self) -> Option<&dyn MutationCursor> {
        None
    }
}

/// Source produced by a statement that may have modified rows.
pub trait MutationCursor: ResultCursor {
    fn rows_affected(&self) -> u64;
}

impl<C: ResultCursor + ?Sized> ResultCursor for Box<C> {
    fn column_count(&self) -> usize {
        (**self).column_count()
    }

    fn fetch_row(&mut self) -> Result<Option<Row>> {
        (**self).fetch_row()
    }

    fn close(&mut self) {
        (**self).close();
    }

    fn as_mutation(&self) -> Option<&dyn MutationCursor> {
        (**self).as_mutation()
    }
}

impl<C: MutationCursor + ?Sized> MutationCursor for Box<C> {
    fn rows_affected(&self) -> u64 {
        (**self).rows_affected()
    }
}

impl<C: ResultCursor + ?Sized> ResultCursor for &mut C {
    fn column_count(&self) -> usize {
        (**self).column_count()
    }

    fn fetch_row(&mut self) -> Result<Option<Row>> {
        (**self).fetch_row()
    }

    fn close(&mut self) {
        (**self).close();
    }

    fn as_mutation(&self) -> Option<&dyn MutationCursor> {
        (**self).as_mutation()
    }
}

impl<C: MutationCursor + ?Sized> MutationCursor for &mut C {
    fn rows_affected(&self) -> u64 {
        (**self).rows_affected()
    }
}

/// Cursor over rows already held in memory.
///
/// Serves results replayed from the cache and doubles as a test source.
#[derive(Debug, Clone, Default)]
pub struct ReplayCursor {
    rows: std::vec::IntoIter<Row>,
    column_count: usize,
    closed: bool,
}

impl ReplayCursor {
    #[must_use]
    pub fn new(rows: Vec<Row>) -> Self {
        let column_count = rows.first().map_or(0, Row::len);
        Self {
            rows: rows.into_iter(),
            column_count,
            closed: false,
        }
    }

    /// Rows not yet fetched.
    #[must_use]
    pub fn remaining(&self) -> usize {
        if self.closed { 0 } else { self.rows.len() }
    }
}

impl ResultCursor for ReplayCursor {
    fn column_count(&self) -> usize {
        self.column_count
    }

    fn fetch_row(&mut self) -> Result<Option<Row>> {
        if self.closed {
            return Ok(None);
        }
        Ok(self.rows.next())
    }

    fn close(&mut self) {
        self.closed = true;
        self.rows = Vec::new().into_iter();
    }
}
