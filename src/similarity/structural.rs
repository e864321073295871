//! Structural similarity between two API records.
//!
//! Four independent signals, each in `[0.0, 1.0]`:
//!
//! | Signal | Method |
//! |--------|--------|
//! | name | Jaccard of normalized words of `title`, falling back to `name` |
//! | description | Jaccard of normalized description words |
//! | path | greedy endpoint matching on method plus path shape |
//! | schema | Jaccard of normalized schema names |

use super::normalize::{PATH_PARAM, normalize_path, normalize_schema_name, words};
use crate::models::{ApiRecord, ComponentScores, EndpointMatch};
use std::collections::HashSet;
use std::hash::Hash;

/// Path score an endpoint pair must exceed to count as a match.
pub const PATH_MATCH_THRESHOLD: f32 = 0.7;

/// Score given to paths with a different number of segments.
pub const SEGMENT_MISMATCH_SCORE: f32 = 0.3;

/// Jaccard index `|a ∩ b| / |a ∪ b|`.
///
/// Two empty sets score 0.0 rather than 1.0: absence of data is not
/// evidence of similarity.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn jaccard<T: Eq + Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f32 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    intersection as f32 / union as f32
}

fn word_set(text: &str) -> HashSet<String> {
    words(text).into_iter().collect()
}

/// Similarity of the display names (title, else name).
#[must_use]
pub fn name_similarity(a: &ApiRecord, b: &ApiRecord) -> f32 {
    jaccard(&word_set(a.display_name()), &word_set(b.display_name()))
}

/// Similarity of the descriptions. A missing description is empty.
#[must_use]
pub fn description_similarity(a: &ApiRecord, b: &ApiRecord) -> f32 {
    let left = word_set(a.description.as_deref().unwrap_or_default());
    let right = word_set(b.description.as_deref().unwrap_or_default());
    jaccard(&left, &right)
}

/// Compares two path templates after normalization.
///
/// ```rust
/// use apidedup::similarity::compare_endpoint_paths;
///
/// assert_eq!(compare_endpoint_paths("/users/{id}", "/users/:id"), 1.0);
/// assert_eq!(compare_endpoint_paths("/a/b", "/a"), 0.3);
/// assert_eq!(compare_endpoint_paths("/users/{id}/orders", "/users/{id}/items"), 2.0 / 3.0);
/// ```
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn compare_endpoint_paths(a: &str, b: &str) -> f32 {
    let left = normalize_path(a);
    let right = normalize_path(b);
    if left == right {
        return 1.0;
    }

    let left: Vec<&str> = left.split('/').filter(|s| !s.is_empty()).collect();
    let right: Vec<&str> = right.split('/').filter(|s| !s.is_empty()).collect();
    if left.len() != right.len() {
        return SEGMENT_MISMATCH_SCORE;
    }

    let matching = left
        .iter()
        .zip(&right)
        .filter(|(l, r)| l == r || **l == PATH_PARAM || **r == PATH_PARAM)
        .count();
    matching as f32 / left.len() as f32
}

/// Greedy endpoint matching.
///
/// Each endpoint of `new_api` takes the first endpoint of `existing` with the
/// same method and a path score above [`PATH_MATCH_THRESHOLD`]. Existing
/// endpoints are not consumed, so several new endpoints may match the same
/// one. The score is `matches / max(|new|, |existing|)`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn path_similarity(new_api: &ApiRecord, existing: &ApiRecord) -> (f32, Vec<EndpointMatch>) {
    let denominator = new_api.endpoints.len().max(existing.endpoints.len());
    if new_api.endpoints.is_empty() || existing.endpoints.is_empty() {
        return (0.0, Vec::new());
    }

    let mut matches = Vec::new();
    for endpoint in &new_api.endpoints {
        let found = existing.endpoints.iter().find_map(|candidate| {
            if candidate.method != endpoint.method {
                return None;
            }
            let score = compare_endpoint_paths(&endpoint.path, &candidate.path);
            (score > PATH_MATCH_THRESHOLD).then_some((candidate, score))
        });

        if let Some((candidate, score)) = found {
            let reason = if (score - 1.0).abs() < f32::EPSILON {
                format!("identical route {}", candidate.signature())
            } else {
                format!("similar route shape ({:.0}% of segments)", score * 100.0)
            };
            matches.push(EndpointMatch {
                new_endpoint: endpoint.clone(),
                existing_endpoint: candidate.clone(),
                score,
                reason,
            });
        }
    }

    let score = matches.len() as f32 / denominator as f32;
    (score.clamp(0.0, 1.0), matches)
}

/// Similarity of the normalized schema-name sets.
#[must_use]
pub fn schema_similarity(a: &ApiRecord, b: &ApiRecord) -> f32 {
    let normalize = |api: &ApiRecord| -> HashSet<String> {
        api.schemas
            .iter()
            .map(|s| normalize_schema_name(s))
            .filter(|s| !s.is_empty())
            .collect()
    };
    jaccard(&normalize(a), &normalize(b))
}

/// Computes all four structural signals.
///
/// The returned scores carry no semantic component.
#[must_use]
pub fn structural_scores(
    new_api: &ApiRecord,
    existing: &ApiRecord,
) -> (ComponentScores, Vec<EndpointMatch>) {
    let (path, matches) = path_similarity(new_api, existing);
    let scores = ComponentScores {
        name: name_similarity(new_api, existing),
        description: description_similarity(new_api, existing),
        path,
        schema: schema_similarity(new_api, existing),
        semantic: None,
    };
    (scores, matches)
}
