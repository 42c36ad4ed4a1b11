//! Ranked result types.

use crate::document::Metadata;

/// A candidate that passed the similarity threshold.
///
/// Never persisted. `metadata` is the snapshot stored with the candidate's
/// vector, which may be stale; callers that display results should prefer
/// fresh catalog fields.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    /// Id of the matched entity in the opposite collection.
    pub counterpart_id: String,
    /// Cosine similarity between the query and the candidate.
    pub score: f64,
    pub metadata: Metadata,
}
