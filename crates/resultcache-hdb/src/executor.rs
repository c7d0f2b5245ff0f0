//! Schema statements run through an hdbconnect connection.

use hdbconnect::Connection;
use resultcache::{SchemaSyncError, StatementExecutor};

impl StatementExecutor for Connection {
    fn execute_statement(&mut self, sql: &str) -> Result<(), SchemaSyncError> {
        tracing::debug!(sql, "executing schema statement");
        self.statement(sql)
            .map(drop)
            .map_err(|e| SchemaSyncError::statement(sql, e.to_string()))
    }
}
