use std::path::PathBuf;
use std::time::Duration;

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Core(#[from] matchdb_core::Error),

    /// The caller stopped waiting. The blocking work may still finish.
    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    /// The blocking task panicked or was cancelled.
    #[error("{operation} task failed: {reason}")]
    TaskFailed {
        operation: &'static str,
        reason: String,
    },

    #[error("cannot load catalog {path:?}: {reason}")]
    CatalogFile { path: PathBuf, reason: String },
}
