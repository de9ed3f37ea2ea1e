use ifcduck_parser::StepError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid IFC header in {}: {source}", .path.display())]
    Header { path: PathBuf, source: StepError },

    #[error("failed to start converter `{program}`: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("converter exited with {}: {stderr}", .status.map_or("a signal".to_string(), |c| format!("status {c}")))]
    Converter { status: Option<i32>, stderr: String },
}
