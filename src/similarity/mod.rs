//! Similarity scoring engine.
//!
//! Pure functions that turn a pair of [`ApiRecord`](crate::models::ApiRecord)s
//! into component scores, an overall score and advisory messages.
//!
//! # Scoring schemes
//!
//! | Scheme | semantic | path | schema | name | description |
//! |--------|----------|------|--------|------|-------------|
//! | Structural | - | 0.40 | 0.25 | 0.20 | 0.15 |
//! | Semantic | 0.35 | 0.25 | 0.20 | 0.12 | 0.08 |

mod fusion;
mod normalize;
mod recommendations;
mod semantic;
mod structural;

pub use fusion::{FusionWeights, SEMANTIC_WEIGHTS, STRUCTURAL_WEIGHTS, fuse, is_duplicate};
pub use normalize::{PATH_PARAM, normalize_path, normalize_schema_name, normalize_text, words};
pub use recommendations::generate_recommendations;
pub use semantic::{
    cosine_similarity, create_embedding_text, normalized_cosine_similarity, semantic_component,
};
pub use structural::{
    PATH_MATCH_THRESHOLD, compare_endpoint_paths, description_similarity, jaccard,
    name_similarity, path_similarity, schema_similarity, structural_scores,
};

use crate::models::{ApiRecord, ComparisonResult, ComponentScores, EndpointMatch};

/// Builds a full comparison result from precomputed component scores.
///
/// Recommendations are generated only for flagged pairs.
#[must_use]
pub fn build_result(
    new_api: &ApiRecord,
    existing: &ApiRecord,
    scores: ComponentScores,
    matched_endpoints: Vec<EndpointMatch>,
    threshold: f32,
) -> ComparisonResult {
    let overall_score = fuse(&scores);
    let flagged = is_duplicate(overall_score, threshold);
    let recommendations = if flagged {
        generate_recommendations(
            existing,
            &scores,
            overall_score,
            matched_endpoints.len(),
            new_api.endpoints.len(),
        )
    } else {
        Vec::new()
    };

    ComparisonResult {
        new_api: new_api.clone(),
        existing: existing.clone(),
        scores,
        overall_score,
        is_duplicate: flagged,
        matched_endpoints,
        recommendations,
    }
}

/// Compares two records structurally and classifies against `threshold`.
///
/// # Example
///
/// ```rust
/// use apidedup::models::{ApiRecord, Endpoint};
/// use apidedup::similarity::compare_structural;
///
/// let a = ApiRecord::new("a", "PetV2").with_endpoint(Endpoint::new("GET", "/pets/{id}")).with_schema("Pet");
/// let b = ApiRecord::new("b", "PetStore").with_endpoint(Endpoint::new("GET", "/pets/:petId")).with_schema("PetDTO");
///
/// let result = compare_structural(&a, &b, 0.5);
/// assert!(result.is_duplicate);
/// assert_eq!(result.matched_endpoints.len(), 1);
/// ```
#[must_use]
pub fn compare_structural(new_api: &ApiRecord, existing: &ApiRecord, threshold: f32) -> ComparisonResult {
    let (scores, matches) = structural_scores(new_api, existing);
    build_result(new_api, existing, scores, matches, threshold)
}

/// Compares two records, fusing in a raw cosine similarity.
#[must_use]
pub fn compare_semantic(
    new_api: &ApiRecord,
    existing: &ApiRecord,
    raw_cosine: f32,
    threshold: f32,
) -> ComparisonResult {
    let (mut scores, matches) = structural_scores(new_api, existing);
    scores.semantic = Some(semantic_component(raw_cosine));
    build_result(new_api, existing, scores, matches, threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Endpoint;

    #[test]
    fn test_unflagged_result_has_no_recommendations() {
        let a = ApiRecord::new("a", "payments");
        let b = ApiRecord::new("b", "inventory");
        let result = compare_structural(&a, &b, 0.75);
        assert!(!result.is_duplicate);
        assert!(result.recommendations.is_empty());
    }

    #[test]
    fn test_semantic_comparison_uses_semantic_weights() {
        let a = ApiRecord::new("a", "orders").with_endpoint(Endpoint::new("GET", "/orders"));
        let b = ApiRecord::new("b", "orders").with_endpoint(Endpoint::new("GET", "/orders"));
        let result = compare_semantic(&a, &b, 1.0, 0.5);
        // 0.35 + 0.25 + 0.12
        assert!((result.overall_score - 0.72).abs() < 1e-6);
        assert!(result.used_semantic());
        assert!(result.recommendations[0].starts_with("Medium confidence"));
    }
}
