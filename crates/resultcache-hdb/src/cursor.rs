//! `ResultCursor` implementations over hdbconnect results.

use hdbconnect::{Connection, HdbResponse, HdbReturnValue, ResultSet};
use resultcache::{CursorError, MutationCursor, ResultCursor, Row};

use crate::conversion::hdb_row_to_row;

/// Live, forward-only cursor over a HANA `ResultSet`.
pub struct HdbResultCursor {
    result_set: Option<ResultSet>,
    columns: Vec<String>,
}

impl std::fmt::Debug for HdbResultCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HdbResultCursor")
            .field("columns", &self.columns)
            .field("open", &self.result_set.is_some())
            .finish()
    }
}

impl HdbResultCursor {
    pub fn new(result_set: ResultSet) -> Self {
        let columns = result_set
            .metadata()
            .iter()
            .map(|f| f.columnname().to_string())
            .collect();
        Self {
            result_set: Some(result_set),
            columns,
        }
    }

    /// Run `sql` as a query and wrap its result set.
    pub fn query(conn: &mut Connection, sql: &str) -> resultcache::Result<Self> {
        let result_set = conn.query(sql).map_err(CursorError::from_source)?;
        Ok(Self::new(result_set))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

impl ResultCursor for HdbResultCursor {
    fn column_count(&self) -> usize {
        self.columns.len()
    }

    fn fetch_row(&mut self) -> resultcache::Result<Option<Row>> {
        let Some(rs) = self.result_set.as_mut() else {
            return Ok(None);
        };

        match rs.next() {
            Some(Ok(row)) => Ok(Some(hdb_row_to_row(&self.columns, &row))),
            Some(Err(e)) => Err(CursorError::from_source(e)),
            None => Ok(None),
        }
    }

    fn close(&mut self) {
        self.result_set = None;
    }
}

/// Cursor over the outcome of an arbitrary statement.
///
/// Carries the first result set of the response, if any, and the total
/// affected-row count reported by the server.
#[derive(Debug)]
pub struct HdbStatementCursor {
    rows: Option<HdbResultCursor>,
    affected: u64,
}

impl HdbStatementCursor {
    pub const fn from_parts(rows: Option<HdbResultCursor>, affected: u64) -> Self {
        Self { rows, affected }
    }

    pub fn from_response(response: HdbResponse) -> Self {
        let mut rows = None;
        let mut affected = 0u64;

        for value in response {
            match value {
                HdbReturnValue::ResultSet(rs) if rows.is_none() => {
                    rows = Some(HdbResultCursor::new(rs));
                }
                HdbReturnValue::AffectedRows(counts) => {
                    affected += counts.iter().map(|&c| c as u64).sum::<u64>();
                }
                _ => {}
            }
        }

        tracing::debug!(
            statement.has_rows = rows.is_some(),
            statement.rows_affected = affected,
            "statement response received"
        );
        Self { rows, affected }
    }

    /// Execute `sql` as a generic statement.
    pub fn execute(conn: &mut Connection, sql: &str) -> resultcache::Result<Self> {
        let response = conn.statement(sql).map_err(CursorError::from_source)?;
        Ok(Self::from_response(response))
    }
}

impl ResultCursor for HdbStatementCursor {
    fn column_count(&self) -> usize {
        self.rows.as_ref().map_or(0, ResultCursor::column_count)
    }

    fn fetch_row(&mut self) -> resultcache::Result<Option<Row>> {
        match self.rows.as_mut() {
            Some(rows) => rows.fetch_row(),
            None => Ok(None),
        }
    }

    fn close(&mut self) {
        if let Some(rows) = self.rows.as_mut() {
            rows.close();
        }
    }

    fn as_mutation(&self) -> Option<&dyn MutationCursor> {
        Some(self)
    }
}

impl MutationCursor for HdbStatementCursor {
    fn rows_affected(&self) -> u64 {
        self.affected
    }
}

#[cfg(test)]
mod tests {
    use resultcache::{CachingCursor, NoopCache};

    use super::*;

    #[test]
    fn test_statement_cursor_without_rows() {
        let mut cursor = HdbStatementCursor::from_parts(None, 5);
        assert_eq!(cursor.column_count(), 0);
        assert!(cursor.fetch_row().unwrap().is_none());
        assert_eq!(cursor.rows_affected(), 5);
    }

    #[test]
    fn test_statement_cursor_exposes_mutation_capability() {
        let cache = NoopCache::new();
        let boxed: Box<dyn ResultCursor> = Box::new(HdbStatementCursor::from_parts(None, 2));
        let cursor = CachingCursor::new(boxed, &cache, "U", "U#1", 0);
        assert_eq!(cursor.try_rows_affected().unwrap(), 2);
    }

    #[test]
    fn test_closed_statement_cursor_stays_empty() {
        let mut cursor = HdbStatementCursor::from_parts(None, 0);
        cursor.close();
        assert!(cursor.fetch_row().unwrap().is_none());
    }
}
