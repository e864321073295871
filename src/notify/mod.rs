//! Duplicate notifications.
//!
//! A [`NotificationDispatcher`] fans a [`DetectionReport`] out to every
//! configured [`Notifier`]: log alerts and signed webhooks.

mod alert;
mod config;
mod dispatcher;
mod payload;
mod webhook;

pub use alert::LogNotifier;
pub use config::{
    AlertConfig, PayloadFormat, RetryConfig, WebhookAuth, WebhookEndpoint, validate_webhooks,
};
pub use dispatcher::{DispatchSummary, NotificationDispatcher};
pub use payload::{
    DUPLICATES_DETECTED, MatchSummary, NotificationPayload, ReportSummary,
    compute_hmac_signature, verify_hmac_signature,
};
pub use webhook::{DeliveryResult, HttpDeliveryBackend, WebhookDelivery, WebhookNotifier};

use crate::Result;
use crate::models::DetectionReport;

/// Delivers detection reports somewhere.
pub trait Notifier: Send + Sync {
    /// Short name used in logs and metrics.
    fn name(&self) -> &'static str;

    /// Delivers `report`.
    ///
    /// # Errors
    ///
    /// Returns an error if delivery fails.
    fn deliver(&self, report: &DetectionReport) -> Result<()>;
}
