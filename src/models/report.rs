//! Detection reports.

use super::{ApiRecord, ComparisonResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What caused a detection run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    /// A new API was registered.
    #[default]
    Created,
    /// An existing API was updated.
    Updated,
    /// Run on demand.
    Manual,
}

impl TriggerKind {
    /// Returns the trigger as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Manual => "manual",
        }
    }
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TriggerKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "created" | "create" | "registered" => Ok(Self::Created),
            "updated" | "update" => Ok(Self::Updated),
            "manual" => Ok(Self::Manual),
            other => Err(crate::Error::InvalidInput(format!(
                "unknown trigger kind: {other}"
            ))),
        }
    }
}

/// Which scoring mode a run used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMode {
    /// Structural signals only.
    Structural,
    /// Structural signals fused with embedding similarity.
    Semantic,
}

impl DetectionMode {
    /// Returns the mode as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Structural => "structural",
            Self::Semantic => "semantic",
        }
    }
}

impl fmt::Display for DetectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ranked duplicates for one triggering API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionReport {
    /// The API that triggered the run.
    pub api: ApiRecord,
    /// Trigger kind.
    pub trigger: TriggerKind,
    /// Flagged results, highest overall score first.
    pub results: Vec<ComparisonResult>,
    /// Number of candidates examined (self excluded).
    pub total_analyzed: usize,
    /// Threshold used for classification.
    pub threshold: f32,
    /// Scoring mode used.
    pub mode: DetectionMode,
    /// When the report was produced.
    pub generated_at: DateTime<Utc>,
}

impl DetectionReport {
    /// Returns true if at least one duplicate was flagged.
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        !self.results.is_empty()
    }

    /// Best-scoring result.
    #[must_use]
    pub fn top_match(&self) -> Option<&ComparisonResult> {
        self.results.first()
    }
}
