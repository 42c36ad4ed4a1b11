//! Error type shared by the store, the ranking code and the matcher.

use crate::document::Collection;
use std::io;
use std::path::PathBuf;

/// Result alias used across matchdb-core.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An id did not resolve at the store or catalog boundary.
    #[error("{collection} entry '{id}' not found")]
    NotFound { collection: Collection, id: String },

    /// A vector's length disagrees with the collection dimension.
    ///
    /// Always fatal: vectors are never truncated or padded to recover.
    #[error("dimension mismatch in {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    /// A vector holds NaN or infinite components and cannot be stored.
    #[error("invalid vector in {context}: {reason}")]
    InvalidVector { context: String, reason: String },

    /// A durable snapshot could not be written or read back.
    #[error("persistence failure on {path:?}: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The embedding provider could not produce a vector.
    #[error("embedding provider '{provider}' unavailable: {reason}")]
    ProviderUnavailable { provider: String, reason: String },

    /// Metadata does not fit the fixed shape of its collection.
    #[error("invalid {collection} metadata: {reason}")]
    InvalidMetadata { collection: Collection, reason: String },

    /// A store or matcher setting is outside its allowed range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The relational catalog failed (as opposed to not containing the id).
    #[error("catalog lookup failed: {0}")]
    Catalog(String),
}

impl Error {
    pub(crate) fn persistence(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Persistence {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn not_found(collection: Collection, id: impl Into<String>) -> Self {
        Error::NotFound {
            collection,
            id: id.into(),
        }
    }

    /// True for the error kinds that indicate a corrupted or misconfigured
    /// index rather than a bad request.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::DimensionMismatch { .. }
                | Error::Persistence { .. }
                | Error::InvalidConfig(_)
        )
    }
}
