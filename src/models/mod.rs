//! Data models for apidedup.
//!
//! This module contains the core data structures used throughout the system.

mod api;
mod comparison;
mod embedding;
mod report;

pub use api::{ApiId, ApiRecord, Endpoint};
pub use comparison::{ComparisonResult, ComponentScores, EndpointMatch};
pub use embedding::ApiEmbedding;
pub use report::{DetectionMode, DetectionReport, TriggerKind};
