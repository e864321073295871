//! Log-based duplicate alerts.

use super::Notifier;
use crate::Result;
use crate::models::DetectionReport;

/// Emits a warning per flagged duplicate and an info summary.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier {
    min_score: f32,
}

impl LogNotifier {
    /// Creates a notifier that logs every flagged result.
    #[must_use]
    pub const fn new() -> Self {
        Self { min_score: 0.0 }
    }

    /// Only logs results at or above `min_score`.
    #[must_use]
    pub const fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }

    /// Number of results in `report` this notifier would alert on.
    #[must_use]
    pub fn alert_count(&self, report: &DetectionReport) -> usize {
        report
            .results
            .iter()
            .filter(|r| r.overall_score >= self.min_score)
            .count()
    }
}

impl Notifier for LogNotifier {
    fn name(&self) -> &'static str {
        "log"
    }

    fn deliver(&self, report: &DetectionReport) -> Result<()> {
        for result in report.results.iter().filter(|r| r.overall_score >= self.min_score) {
            tracing::warn!(
                api_name = %report.api.name,
                duplicate_of = %result.existing.name,
                overall_score = result.overall_score,
                semantic = result.used_semantic(),
                "Potential duplicate API detected"
            );
        }

        tracing::info!(
            api_name = %report.api.name,
            trigger = %report.trigger,
            mode = %report.mode,
            duplicates = report.results.len(),
            alerted = self.alert_count(report),
            total_analyzed = report.total_analyzed,
            "Duplicate check complete"
        );
        Ok(())
    }
}
