//! Fallback embedder (structural-only mode).

use super::Embedder;
use crate::Result;

/// Fallback embedder that returns empty vectors.
///
/// Used when no embedding provider is configured. Detection runs that receive
/// an empty vector proceed with structural scoring only.
pub struct FallbackEmbedder;

impl FallbackEmbedder {
    /// Creates a new fallback embedder.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Default for FallbackEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl Embedder for FallbackEmbedder {
    fn dimensions(&self) -> usize {
        0
    }

    fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_always_empty() {
        let embedder = FallbackEmbedder::new();
        assert_eq!(embedder.dimensions(), 0);
        assert!(embedder.embed("anything").unwrap().is_empty());

        let batch = embedder.embed_batch(&["a", "b"]).unwrap();
        assert_eq!(batch.len(), 2);
        assert!(batch.iter().all(Vec::is_empty));
    }
}
