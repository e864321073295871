//! Weighted score fusion and threshold classification.

use super::semantic::semantic_component;
use crate::models::ComponentScores;

/// Fusion weights for one scoring scheme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionWeights {
    /// Embedding similarity weight.
    pub semantic: f32,
    /// Endpoint path weight.
    pub path: f32,
    /// Schema name weight.
    pub schema: f32,
    /// Name weight.
    pub name: f32,
    /// Description weight.
    pub description: f32,
}

impl FusionWeights {
    /// Sum of all weights.
    #[must_use]
    pub fn total(&self) -> f32 {
        self.semantic + self.path + self.schema + self.name + self.description
    }
}

/// Weights when only structural signals are available.
pub const STRUCTURAL_WEIGHTS: FusionWeights = FusionWeights {
    semantic: 0.0,
    path: 0.40,
    schema: 0.25,
    name: 0.20,
    description: 0.15,
};

/// Weights when an embedding similarity is available.
pub const SEMANTIC_WEIGHTS: FusionWeights = FusionWeights {
    semantic: 0.35,
    path: 0.25,
    schema: 0.20,
    name: 0.12,
    description: 0.08,
};

fn weighted(scores: &ComponentScores, weights: &FusionWeights) -> f32 {
    let total = weights.semantic * semantic_component(scores.semantic_or_zero())
        + weights.path * scores.path
        + weights.schema * scores.schema
        + weights.name * scores.name
        + weights.description * scores.description;
    total.clamp(0.0, 1.0)
}

/// Fuses component scores into an overall score.
///
/// The semantic scheme is chosen when `scores.semantic` is present.
///
/// ```rust
/// use apidedup::models::ComponentScores;
/// use apidedup::similarity::fuse;
///
/// let scores = ComponentScores { path: 1.0, schema: 1.0, ..Default::default() };
/// assert!((fuse(&scores) - 0.65).abs() < 1e-6);
/// ```
#[must_use]
pub fn fuse(scores: &ComponentScores) -> f32 {
    if scores.used_semantic() {
        weighted(scores, &SEMANTIC_WEIGHTS)
    } else {
        weighted(scores, &STRUCTURAL_WEIGHTS)
    }
}

/// Returns true if `overall` reaches `threshold`. Equality counts.
#[must_use]
pub fn is_duplicate(overall: f32, threshold: f32) -> bool {
    overall >= threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    fn all(value: f32, semantic: Option<f32>) -> ComponentScores {
        ComponentScores {
            name: value,
            description: value,
            path: value,
            schema: value,
            semantic,
        }
    }

    #[test]
    fn test_weights_sum_to_one() {
        assert!(approx_eq(STRUCTURAL_WEIGHTS.total(), 1.0));
        assert!(approx_eq(SEMANTIC_WEIGHTS.total(), 1.0));
    }

    #[test]
    fn test_structural_fusion() {
        let scores = ComponentScores {
            name: 0.5,
            description: 0.2,
            path: 0.8,
            schema: 0.4,
            semantic: None,
        };
        // 0.40*0.8 + 0.25*0.4 + 0.20*0.5 + 0.15*0.2
        assert!(approx_eq(fuse(&scores), 0.55));
    }

    #[test]
    fn test_semantic_fusion() {
        let scores = ComponentScores {
            name: 1.0,
            description: 0.0,
            path: 0.5,
            schema: 0.0,
            semantic: Some(0.9),
        };
        // 0.35*0.9 + 0.25*0.5 + 0.12*1.0
        assert!(approx_eq(fuse(&scores), 0.56));
    }

    #[test]
    fn test_negative_semantic_contributes_nothing() {
        let scores = all(0.0, Some(-0.8));
        assert!(approx_eq(fuse(&scores), 0.0));
    }

    #[test]
    fn test_all_ones_fuse_to_one() {
        assert!(approx_eq(fuse(&all(1.0, None)), 1.0));
        assert!(approx_eq(fuse(&all(1.0, Some(1.0))), 1.0));
    }

    #[test_case(0.0, 0.0 => true; "zero at zero")]
    #[test_case(0.49, 0.5 => false; "below half")]
    #[test_case(0.5, 0.5 => true; "exactly half")]
    #[test_case(0.7, 0.7 => true; "exactly seven tenths")]
    #[test_case(0.69, 0.7 => false; "just under seven tenths")]
    #[test_case(0.9, 0.9 => true; "exactly nine tenths")]
    #[test_case(0.99, 1.0 => false; "just under one")]
    #[test_case(1.0, 1.0 => true; "one at one")]
    fn test_is_duplicate(overall: f32, threshold: f32) -> bool {
        is_duplicate(overall, threshold)
    }
}
