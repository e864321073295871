//! Advisory messages derived from a score breakdown.

use crate::models::{ApiRecord, ComponentScores};

/// Overall score for a high-confidence duplicate.
pub const HIGH_CONFIDENCE: f32 = 0.9;
/// Overall score for a medium-confidence match.
pub const MEDIUM_CONFIDENCE: f32 = 0.7;
/// Semantic score above which both APIs are judged to serve the same purpose.
pub const SEMANTIC_SAME_PURPOSE: f32 = 0.85;
/// Semantic score above which functionality is judged similar.
pub const SEMANTIC_SIMILAR: f32 = 0.7;
/// Path score above which endpoint overlap is reported.
pub const PATH_OVERLAP: f32 = 0.8;
/// Schema score above which shared data models are reported.
pub const SCHEMA_OVERLAP: f32 = 0.7;
/// Name score above which a naming conflict is reported.
pub const NAME_CONFLICT: f32 = 0.8;

fn percent(score: f32) -> String {
    format!("{:.0}", score * 100.0)
}

/// Generates recommendations, most important first.
///
/// The rules are independent; the last message, pointing at the owner of
/// the existing API, is always present.
#[must_use]
pub fn generate_recommendations(
    existing: &ApiRecord,
    scores: &ComponentScores,
    overall: f32,
    matched_endpoints: usize,
    new_endpoints: usize,
) -> Vec<String> {
    let name = existing.display_name();
    let mut out = Vec::new();

    if overall >= HIGH_CONFIDENCE {
        out.push(format!(
            "High confidence duplicate ({}% similar). Consider consolidating with '{name}' instead of registering a new API.",
            percent(overall)
        ));
    } else if overall >= MEDIUM_CONFIDENCE {
        out.push(format!(
            "Medium confidence match ({}% similar). Review '{name}' to check whether it already covers this use case.",
            percent(overall)
        ));
    }

    if let Some(semantic) = scores.semantic {
        if semantic > SEMANTIC_SAME_PURPOSE {
            out.push(format!(
                "AI analysis: both APIs appear to serve the same purpose ({}% semantic similarity).",
                percent(semantic)
            ));
        } else if semantic > SEMANTIC_SIMILAR {
            out.push(format!(
                "AI analysis: similar functionality detected ({}% semantic similarity). Check for overlapping responsibilities.",
                percent(semantic)
            ));
        }
    }

    if scores.path > PATH_OVERLAP {
        out.push(format!(
            "{matched_endpoints} of {new_endpoints} endpoints match existing endpoints in '{name}'."
        ));
    }

    if scores.schema > SCHEMA_OVERLAP {
        out.push(format!(
            "Data models overlap with '{name}' ({}% shared). Consider reusing its schemas.",
            percent(scores.schema)
        ));
    }

    if scores.name > NAME_CONFLICT {
        out.push(format!(
            "The API name is very similar to '{name}'. Choose a distinct name to avoid confusion."
        ));
    }

    out.push(format!(
        "Contact the owner of '{name}' to discuss consolidation or reuse."
    ));
    out
}
