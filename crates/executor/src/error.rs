use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("database file is empty: {}", .0.display())]
    Empty(PathBuf),
}
