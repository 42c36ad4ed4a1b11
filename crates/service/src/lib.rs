//! matchdb-service — async host and operator CLI for matchdb.
//!
//! Wraps the blocking core behind timeouts and loads the catalog from a
//! JSON document. Matching logic lives in `matchdb-core`.

/// JSON catalog document loaded into an in-memory catalog.
pub mod catalog_file;
/// Service-level error type.
pub mod error;
/// Tracing subscriber setup for the binary.
pub mod logging;
/// Timeout-bounded async facade over the matcher.
pub mod timed;

pub use error::{ServiceError, ServiceResult};
pub use timed::TimedMatcher;
