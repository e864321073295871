//! Detection configuration.

/// Default similarity threshold.
pub const DEFAULT_THRESHOLD: f32 = 0.75;

/// Default vector search breadth.
pub const DEFAULT_TOP_K: usize = 20;

/// Configuration for a detection run.
///
/// # Environment Variables
///
/// | Variable | Type | Default | Description |
/// |----------|------|---------|-------------|
/// | `APIDEDUP_SIMILARITY_THRESHOLD` | f32 | `0.75` | Overall score that flags a duplicate |
/// | `APIDEDUP_SEMANTIC_ENABLED` | bool | `false` | Use embeddings when available |
/// | `APIDEDUP_TOP_K` | usize | `20` | Nearest neighbors fetched per run |
///
/// # Example
///
/// ```rust
/// use apidedup::services::DetectionConfig;
///
/// let config = DetectionConfig::default().with_threshold(1.7);
/// assert_eq!(config.similarity_threshold, 1.0);
/// assert!(!config.semantic_enabled);
/// assert_eq!(config.top_k, 20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionConfig {
    /// Overall score at or above which a pair is flagged.
    pub similarity_threshold: f32,
    /// Whether semantic scoring is requested.
    pub semantic_enabled: bool,
    /// Nearest neighbors fetched from the embedding store.
    pub top_k: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_THRESHOLD,
            semantic_enabled: false,
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl DetectionConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration from environment variables.
    ///
    /// Falls back to defaults for unset or unparseable variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Applies environment overrides on top of `self`.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(threshold) = std::env::var("APIDEDUP_SIMILARITY_THRESHOLD")
            .ok()
            .and_then(|v| v.trim().parse::<f32>().ok())
        {
            self = self.with_threshold(threshold);
        }

        if let Ok(v) = std::env::var("APIDEDUP_SEMANTIC_ENABLED") {
            self.semantic_enabled = parse_bool(&v).unwrap_or(self.semantic_enabled);
        }

        if let Some(top_k) = std::env::var("APIDEDUP_TOP_K")
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
        {
            self = self.with_top_k(top_k);
        }

        self
    }

    /// Sets the threshold, clamped to `[0.0, 1.0]`.
    ///
    /// Out-of-range values are logged; NaN keeps the current threshold.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        if threshold.is_nan() {
            tracing::warn!("Ignoring NaN similarity threshold");
            return self;
        }
        let clamped = threshold.clamp(0.0, 1.0);
        if (clamped - threshold).abs() > f32::EPSILON {
            tracing::warn!(requested = threshold, used = clamped, "Similarity threshold clamped to [0, 1]");
        }
        self.similarity_threshold = clamped;
        self
    }

    /// Enables or disables semantic scoring.
    #[must_use]
    pub const fn with_semantic_enabled(mut self, enabled: bool) -> Self {
        self.semantic_enabled = enabled;
        self
    }

    /// Sets the search breadth. Zero is raised to one.
    #[must_use]
    pub const fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = if top_k == 0 { 1 } else { top_k };
        self
    }
}

/// Parses common boolean spellings.
fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_defaults() {
        let config = DetectionConfig::default();
        assert!((config.similarity_threshold - 0.75).abs() < f32::EPSILON);
        assert!(!config.semantic_enabled);
        assert_eq!(config.top_k, 20);
    }

    #[test_case(-0.5 => 0.0; "below range")]
    #[test_case(0.0 => 0.0; "lower bound")]
    #[test_case(0.6 => 0.6; "in range")]
    #[test_case(1.0 => 1.0; "upper bound")]
    #[test_case(3.0 => 1.0; "above range")]
    fn test_threshold_clamped(threshold: f32) -> f32 {
        DetectionConfig::default().with_threshold(threshold).similarity_threshold
    }

    #[test]
    fn test_nan_threshold_ignored() {
        let config = DetectionConfig::default().with_threshold(f32::NAN);
        assert!((config.similarity_threshold - DEFAULT_THRESHOLD).abs() < f32::EPSILON);
    }

    #[test]
    fn test_top_k_floor() {
        assert_eq!(DetectionConfig::default().with_top_k(0).top_k, 1);
    }

    #[test_case("true" => Some(true))]
    #[test_case(" YES " => Some(true))]
    #[test_case("0" => Some(false))]
    #[test_case("off" => Some(false))]
    #[test_case("maybe" => None)]
    fn test_parse_bool(value: &str) -> Option<bool> {
        parse_bool(value)
    }
}
