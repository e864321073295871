//! Pairwise comparison results.

use super::{ApiRecord, Endpoint};
use serde::{Deserialize, Serialize};

/// Per-signal similarity scores, each in `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ComponentScores {
    /// Name (or title) word-set similarity.
    pub name: f32,
    /// Description word-set similarity.
    pub description: f32,
    /// Endpoint path similarity.
    pub path: f32,
    /// Schema-name similarity.
    pub schema: f32,
    /// Embedding similarity; `None` when semantic scoring was not used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic: Option<f32>,
}

impl ComponentScores {
    /// Returns true if a semantic score is present.
    #[must_use]
    pub const fn used_semantic(&self) -> bool {
        self.semantic.is_some()
    }

    /// Semantic score, or 0.0 when unused.
    #[must_use]
    pub fn semantic_or_zero(&self) -> f32 {
        self.semantic.unwrap_or(0.0)
    }
}

/// A pair of endpoints judged to be the same operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointMatch {
    /// Endpoint of the newly registered API.
    pub new_endpoint: Endpoint,
    /// Endpoint of the existing API.
    pub existing_endpoint: Endpoint,
    /// Path similarity of the pair.
    pub score: f32,
    /// Human-readable reason for the match.
    pub reason: String,
}

/// Outcome of comparing a new API with one existing API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// The newly registered API.
    pub new_api: ApiRecord,
    /// The existing catalog API.
    pub existing: ApiRecord,
    /// Component scores.
    pub scores: ComponentScores,
    /// Fused overall score.
    pub overall_score: f32,
    /// Whether the pair is flagged as a duplicate.
    pub is_duplicate: bool,
    /// Matched endpoint pairs.
    pub matched_endpoints: Vec<EndpointMatch>,
    /// Advisory messages, most important first.
    pub recommendations: Vec<String>,
}

impl ComparisonResult {
    /// Returns true if semantic scoring contributed to this result.
    #[must_use]
    pub const fn used_semantic(&self) -> bool {
        self.scores.used_semantic()
    }
}
