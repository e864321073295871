//! Duplicate detection.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      DetectionService                        │
//! │  ┌────────────────────┐        ┌──────────────────────────┐  │
//! │  │ SemanticScorer     │        │ Structural scoring       │  │
//! │  │                    │        │                          │  │
//! │  │ embed + top-K      │  ───▶  │ name / description /     │  │
//! │  │ (local fallback)   │        │ path / schema + fusion   │  │
//! │  └────────────────────┘        └──────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod semantic;
mod service;

pub use config::{DEFAULT_THRESHOLD, DEFAULT_TOP_K, DetectionConfig};
pub use semantic::SemanticScorer;
pub use service::DetectionService;
