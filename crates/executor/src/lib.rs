//! DuckDB execution for ifcduck.
//!
//! Every operation opens its own connection and drops it before returning, on
//! success and on error alike. Nothing is pooled or cached between calls.

use duckdb::{AccessMode, Config, Connection};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub mod demo;
mod error;
mod query;
mod values;

pub use demo::{DEMO_QUERIES, DemoQuery, DemoStep};
pub use error::ExecutorError;
pub use query::QueryResult;

/// Runs statements against one DuckDB database file.
#[derive(Debug, Clone)]
pub struct Executor {
    database: PathBuf,
}

impl Executor {
    pub fn new<P: Into<PathBuf>>(database: P) -> Self {
        Self {
            database: database.into(),
        }
    }

    pub fn database(&self) -> &Path {
        &self.database
    }

    /// Check that the file opens as a DuckDB database in read-only mode.
    pub fn validate(&self) -> Result<(), ExecutorError> {
        let meta = std::fs::metadata(&self.database)?;
        if meta.len() == 0 {
            return Err(ExecutorError::Empty(self.database.clone()));
        }
        let conn = self.open_read_only()?;
        drop(conn);
        debug!(path = %self.database.display(), "database validated");
        Ok(())
    }

    /// Execute `sql` on a read-write connection.
    ///
    /// The text may hold several statements; they run in order and the result
    /// set of the last one is returned. Failures are reported inside the
    /// returned [`QueryResult`], never as an `Err`.
    pub fn execute(&self, sql: &str) -> QueryResult {
        let conn = match self.open_read_write() {
            Ok(conn) => conn,
            Err(e) => return QueryResult::failure(e.to_string()),
        };
        let result = query::run_script(&conn, sql);
        drop(conn);
        result
    }

    /// Run the fixed demonstration queries, each isolated from the others.
    pub fn demonstrate(&self) -> Result<Vec<DemoStep>, ExecutorError> {
        let conn = self.open_read_only()?;
        info!(path = %self.database.display(), "running demonstration queries");
        Ok(demo::run(&conn, DEMO_QUERIES))
    }

    fn open_read_write(&self) -> Result<Connection, ExecutorError> {
        if !self.database.exists() {
            return Err(ExecutorError::NotFound(self.database.clone()));
        }
        Ok(Connection::open(&self.database)?)
    }

    fn open_read_only(&self) -> Result<Connection, ExecutorError> {
        let config = Config::default().access_mode(AccessMode::ReadOnly)?;
        Ok(Connection::open_with_flags(&self.database, config)?)
    }
}

/// Shorthand for `Executor::new(path).execute(sql)`.
pub fn execute_query(path: &Path, sql: &str) -> QueryResult {
    Executor::new(path).execute(sql)
}

/// Shorthand for `Executor::new(path).validate()`.
pub fn validate_database(path: &Path) -> Result<(), ExecutorError> {
    Executor::new(path).validate()
}
