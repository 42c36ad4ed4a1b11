//! Search primitives: cosine similarity, brute-force ranking and match results.
//!
//! Ranking is an exact linear scan, O(N·D) per query. No index structure is
//! built or kept between calls.

/// Cosine similarity over f64 vectors.
pub mod similarity;
/// Threshold, sort and truncate a candidate set against a query vector.
pub mod ranking;
/// Ranked result types.
pub mod types;

pub use ranking::rank;
pub use similarity::cosine_similarity;
pub use types::MatchResult;
