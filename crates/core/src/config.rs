//! Global configuration constants for matchdb.
//!
//! Matching defaults, input limits and storage defaults are defined here.
//! These are compile-time constants; runtime configuration is handled via CLI
//! arguments and environment variables in the service binary.

/// Default minimum cosine similarity a counterpart needs to be listed.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.75;

/// Default number of counterparts returned by a listing call.
pub const DEFAULT_MAX_MATCHES: usize = 10;

/// Upper bound on the `limit` of a listing call.
pub const MAX_MATCH_LIMIT: usize = 50;

/// Number of description characters that enter a job posting's embedding text.
///
/// Both sides of a comparison must agree on this value, otherwise scores
/// between old and new embeddings stop being comparable.
pub const JOB_DESCRIPTION_EMBED_CHARS: usize = 500;

/// Separator between the segments of a composed embedding text.
pub const SEGMENT_SEPARATOR: &str = " | ";

/// Default embedding dimension (matches all-MiniLM-L6-v2).
pub const DEFAULT_DIMENSION: usize = 384;

/// Maximum allowed embedding dimension.
pub const MAX_DIMENSION: usize = 4096;

/// Default directory for collection snapshots.
pub const DEFAULT_DATA_DIR: &str = "data/embeddings";

/// Extension of a collection snapshot file.
pub const SNAPSHOT_EXTENSION: &str = "json";

/// Default per-operation timeout, in seconds, applied by async hosts.
pub const DEFAULT_OPERATION_TIMEOUT_SECS: u64 = 30;
