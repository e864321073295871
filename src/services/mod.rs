//! Business logic services.

mod backend_factory;
pub mod detection;

pub use backend_factory::{BackendFactory, BackendSet};
pub use detection::{DEFAULT_THRESHOLD, DEFAULT_TOP_K, DetectionConfig, DetectionService, SemanticScorer};
