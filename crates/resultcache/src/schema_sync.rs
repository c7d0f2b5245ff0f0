//! Batch DDL runner.
//!
//! Unrelated to result caching: applies a list of schema statements through
//! a [`StatementExecutor`], either stopping at the first failure or running
//! everything and reporting what failed.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaSyncError {
    #[error("statement failed: {sql}: {message}")]
    Statement { sql: String, message: String },
}

impl SchemaSyncError {
    pub fn statement(sql: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Statement {
            sql: sql.into(),
            message: message.into(),
        }
    }
}

/// Anything that can run a single SQL statement.
pub trait StatementExecutor {
    fn execute_statement(&mut self, sql: &str) -> Result<(), SchemaSyncError>;
}

impl<E: StatementExecutor + ?Sized> StatementExecutor for &mut E {
    fn execute_statement(&mut self, sql: &str) -> Result<(), SchemaSyncError> {
        (**self).execute_statement(sql)
    }
}

/// Outcome of [`SchemaSynchronizer::process_safely`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub executed: usize,
    pub failed: Vec<String>,
}

impl SyncReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug)]
pub struct SchemaSynchronizer<E> {
    executor: E,
}

impl<E: StatementExecutor> SchemaSynchronizer<E> {
    pub const fn new(executor: E) -> Self {
        Self { executor }
    }

    pub fn into_inner(self) -> E {
        self.executor
    }

    /// Run every statement in order, stopping at the first failure.
    pub fn process<I, T>(&mut self, statements: I) -> Result<usize, SchemaSyncError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut executed = 0;
        for sql in statements {
            self.executor.execute_statement(sql.as_ref())?;
            executed += 1;
        }
        Ok(executed)
    }

    /// Run every statement, ignoring individual failures.
    pub fn process_safely<I, T>(&mut self, statements: I) -> SyncReport
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut report = SyncReport::default();
        for sql in statements {
            let sql = sql.as_ref();
            match self.executor.execute_statement(sql) {
                Ok(()) => report.executed += 1,
                Err(e) => {
                    tracing::debug!(error = %e, "ignoring failed schema statement");
                    report.failed.push(sql.to_string());
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Recorder {
        ran: Vec<String>,
    }

    impl StatementExecutor for Recorder {
        fn execute_statement(&mut self, sql: &str) -> Result<(), SchemaSyncError> {
            self.ran.push(sql.to_string());
            if sql.starts_with("DROP") {
                return Err(SchemaSyncError::statement(sql, "object does not exist"));
            }
            Ok(())
        }
    }

    const BATCH: [&str; 3] = ["CREATE TABLE a (id INT)", "DROP TABLE b", "CREATE INDEX i ON a (id)"];

    #[test]
    fn test_process_stops_at_first_error() {
        let mut sync = SchemaSynchronizer::new(Recorder::default());
        let err = sync.process(BATCH).unwrap_err();

        assert!(err.to_string().contains("DROP TABLE b"));
        assert_eq!(sync.into_inner().ran.len(), 2);
    }

    #[test]
    fn test_process_safely_runs_everything() {
        let mut sync = SchemaSynchronizer::new(Recorder::default());
        let report = sync.process_safely(BATCH);

        assert_eq!(report.executed, 2);
        assert_eq!(report.failed, vec!["DROP TABLE b".to_string()]);
        assert!(!report.is_clean());
        assert_eq!(sync.into_inner().ran.len(), 3);
    }

    #[test]
    fn test_process_counts_statements() {
        let mut recorder = Recorder::default();
        let mut sync = SchemaSynchronizer::new(&mut recorder);
        assert_eq!(sync.process(["CREATE TABLE x (id INT)"]).unwrap(), 1);
        assert_eq!(recorder.ran, vec!["CREATE TABLE x (id INT)"]);
    }
}
