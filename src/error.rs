use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed record in {file}:{line_no} ({reason}): {line:?}")]
    MalformedRecord {
        file: String,
        line_no: usize,
        line: String,
        reason: String,
    },

    #[error("Source unavailable: {path} - {reason}")]
    SourceUnavailable { path: PathBuf, reason: String },

    #[error("Store unavailable during {operation}: {source}")]
    StoreUnavailable {
        operation: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Async task error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl PipelineError {
    /// Wrap a storage-layer fault with the operation that hit it.
    pub fn store(operation: impl Into<String>, source: rusqlite::Error) -> Self {
        Self::StoreUnavailable {
            operation: operation.into(),
            source,
        }
    }

    /// Per-line failures are local to their record; everything else aborts the run.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::MalformedRecord { .. })
    }
}
