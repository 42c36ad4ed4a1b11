//! Threshold, sort and truncate a candidate set against a query vector.

use super::similarity::cosine_similarity;
use super::types::MatchResult;
use crate::document::Metadata;
use std::cmp::Ordering;

/// Rank `candidates` by cosine similarity to `query`.
///
/// Keeps candidates scoring at least `min_score`, orders them by score
/// descending with ties broken by ascending id, and returns at most `limit`
/// results. The output depends only on the inputs, so repeated calls over
/// unchanged candidates return identical lists.
pub fn rank<'a, I>(query: &[f64], candidates: I, limit: usize, min_score: f64) -> Vec<MatchResult>
where
    I: IntoIterator<Item = (&'a str, &'a [f64], &'a Metadata)>,
{
    if limit == 0 {
        return Vec::new();
    }

    // NaN never satisfies `>=`, so non-finite scores drop out here.
    let mut scored: Vec<(f64, &'a str, &'a Metadata)> = candidates
        .into_iter()
        .filter_map(|(id, vector, metadata)| {
            let score = cosine_similarity(query, vector);
            (score >= min_score).then_some((score, id, metadata))
        })
        .collect();

    scored.sort_by(|a, b| compare_ranked(a.0, a.1, b.0, b.1));
    scored.truncate(limit);

    scored
        .into_iter()
        .map(|(score, id, metadata)| MatchResult {
            counterpart_id: id.to_string(),
            score,
            metadata: metadata.clone(),
        })
        .collect()
}

/// Score descending, then id ascending.
pub(crate) fn compare_ranked(score_a: f64, id_a: &str, score_b: f64, id_b: &str) -> Ordering {
    score_b.total_cmp(&score_a).then_with(|| id_a.cmp(id_b))
}
