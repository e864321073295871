//! Fan-out of detection reports to notifiers.

use super::Notifier;
use crate::models::DetectionReport;
use std::sync::Arc;
use tracing::instrument;

/// Outcome of dispatching one report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Notifiers that delivered.
    pub delivered: usize,
    /// Notifiers that failed.
    pub failed: usize,
    /// True if the report was not dispatched at all.
    pub skipped: bool,
}

/// Sends reports to every registered notifier.
///
/// Notification failures are logged and counted; they never fail the
/// detection run that produced the report.
#[derive(Clone, Default)]
pub struct NotificationDispatcher {
    notifiers: Vec<Arc<dyn Notifier>>,
    notify_when_empty: bool,
}

impl NotificationDispatcher {
    /// Creates a dispatcher with no notifiers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a notifier.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifiers.push(notifier);
        self
    }

    /// Also dispatch reports with no duplicates.
    #[must_use]
    pub const fn with_notify_when_empty(mut self, enabled: bool) -> Self {
        self.notify_when_empty = enabled;
        self
    }

    /// Number of registered notifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    /// Returns true if no notifiers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }

    /// Delivers `report` to every notifier.
    #[instrument(skip(self, report), fields(operation = "dispatch", api_name = %report.api.name, notifiers = self.notifiers.len()))]
    pub fn dispatch(&self, report: &DetectionReport) -> DispatchSummary {
        if !report.has_duplicates() && !self.notify_when_empty {
            return DispatchSummary {
                skipped: true,
                ..DispatchSummary::default()
            };
        }

        let mut summary = DispatchSummary::default();
        for notifier in &self.notifiers {
            match notifier.deliver(report) {
                Ok(()) => {
                    summary.delivered += 1;
                    metrics::counter!(
                        "notification_deliveries_total",
                        "notifier" => notifier.name(),
                        "result" => "success"
                    )
                    .increment(1);
                },
                Err(e) => {
                    summary.failed += 1;
                    tracing::warn!(notifier = notifier.name(), error = %e, "Notification failed");
                    metrics::counter!(
                        "notification_deliveries_total",
                        "notifier" => notifier.name(),
                        "result" => "failure"
                    )
                    .increment(1);
                },
            }
        }
        summary
    }
}
