//! Webhook notifications.
//!
//! # Retry Strategy
//!
//! Network errors and 5xx responses are retried with exponential backoff
//! (`base_delay_ms * 2^(attempt - 1)`). 4xx responses fail immediately.

use super::Notifier;
use super::config::{PayloadFormat, RetryConfig, WebhookAuth, WebhookEndpoint};
use super::payload::{NotificationPayload, compute_hmac_signature};
use crate::models::DetectionReport;
use crate::{Error, Result};
use secrecy::ExposeSecret;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::instrument;

/// Outcome of delivering one payload to one endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryResult {
    /// Whether delivery succeeded.
    pub success: bool,
    /// Last HTTP status code received.
    pub status_code: Option<u16>,
    /// Attempts made.
    pub attempts: u32,
    /// Total time spent.
    pub duration_ms: u64,
    /// Error message on failure.
    pub error: Option<String>,
}

impl DeliveryResult {
    /// Creates a successful result.
    #[must_use]
    pub const fn success(status_code: u16, attempts: u32, duration_ms: u64) -> Self {
        Self {
            success: true,
            status_code: Some(status_code),
            attempts,
            duration_ms,
            error: None,
        }
    }

    /// Creates a failed result.
    #[must_use]
    pub const fn failure(
        status_code: Option<u16>,
        error: String,
        attempts: u32,
        duration_ms: u64,
    ) -> Self {
        Self {
            success: false,
            status_code,
            attempts,
            duration_ms,
            error: Some(error),
        }
    }
}

/// Sends a payload to an endpoint.
pub trait WebhookDelivery: Send + Sync {
    /// Delivers `payload` to `endpoint`, retrying as configured.
    ///
    /// # Errors
    ///
    /// Returns an error only if delivery could not be attempted at all.
    /// HTTP failures are reported through [`DeliveryResult`].
    fn deliver(
        &self,
        endpoint: &WebhookEndpoint,
        payload: &NotificationPayload,
    ) -> Result<DeliveryResult>;
}

/// A failed attempt.
#[derive(Debug)]
struct AttemptError {
    status: Option<u16>,
    message: String,
}

impl AttemptError {
    /// Client errors are not retried.
    fn is_retryable(&self) -> bool {
        !matches!(self.status, Some(400..=499))
    }
}

/// Blocking HTTP delivery backend.
pub struct HttpDeliveryBackend {
    client: reqwest::blocking::Client,
}

impl HttpDeliveryBackend {
    /// Creates a backend with a shared connection pool.
    #[must_use]
    pub fn new() -> Self {
        let client = reqwest::blocking::Client::builder()
            .user_agent(format!("apidedup/{}", env!("CARGO_PKG_VERSION")))
            .pool_max_idle_per_host(10)
            .build()
            .unwrap_or_else(|err| {
                tracing::warn!(error = %err, "Failed to build webhook HTTP client, using defaults");
                reqwest::blocking::Client::new()
            });

        Self { client }
    }

    fn attempt(
        &self,
        endpoint: &WebhookEndpoint,
        payload: &NotificationPayload,
    ) -> std::result::Result<u16, AttemptError> {
        let body = match endpoint.format {
            PayloadFormat::Default => payload.to_json(),
            PayloadFormat::Slack => payload.to_slack_json(),
        };

        let mut request = self
            .client
            .post(&endpoint.url)
            .header("Content-Type", "application/json")
            .header("X-Apidedup-Event", &payload.event_type)
            .header("X-Apidedup-Delivery-Id", &payload.event_id)
            .timeout(Duration::from_secs(endpoint.retry.timeout_secs));

        request = add_auth_headers(request, &endpoint.auth, &body);

        let response = request.body(body).send().map_err(|e| AttemptError {
            status: None,
            message: format!("HTTP request failed: {e}"),
        })?;

        let status = response.status();
        if status.is_success() {
            Ok(status.as_u16())
        } else {
            Err(AttemptError {
                status: Some(status.as_u16()),
                message: format!("HTTP {} response", status.as_u16()),
            })
        }
    }

    fn deliver_with_retry(
        &self,
        endpoint: &WebhookEndpoint,
        payload: &NotificationPayload,
    ) -> DeliveryResult {
        let start = Instant::now();
        let retry: &RetryConfig = &endpoint.retry;
        let max_attempts = retry.max_retries + 1;
        let mut attempt = 1;

        loop {
            match self.attempt(endpoint, payload) {
                Ok(status) => return DeliveryResult::success(status, attempt, elapsed_ms(start)),
                Err(err) if !err.is_retryable() || attempt >= max_attempts => {
                    return DeliveryResult::failure(
                        err.status,
                        err.message,
                        attempt,
                        elapsed_ms(start),
                    );
                },
                Err(err) => {
                    let delay_ms = retry.delay_for_attempt(attempt);
                    tracing::debug!(
                        webhook = %endpoint.name,
                        attempt,
                        delay_ms,
                        error = %err.message,
                        "Webhook delivery failed, retrying"
                    );
                    std::thread::sleep(Duration::from_millis(delay_ms));
                    attempt += 1;
                },
            }
        }
    }
}

impl Default for HttpDeliveryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl WebhookDelivery for HttpDeliveryBackend {
    #[instrument(skip(self, payload), fields(operation = "webhook_deliver", webhook = %endpoint.name))]
    fn deliver(
        &self,
        endpoint: &WebhookEndpoint,
        payload: &NotificationPayload,
    ) -> Result<DeliveryResult> {
        Ok(self.deliver_with_retry(endpoint, payload))
    }
}

/// The signature covers the exact body sent.
fn add_auth_headers(
    mut request: reqwest::blocking::RequestBuilder,
    auth: &WebhookAuth,
    body: &str,
) -> reqwest::blocking::RequestBuilder {
    if let Some(token) = auth.bearer_token() {
        request = request.header("Authorization", format!("Bearer {}", token.expose_secret()));
    }
    if let Some(secret) = auth.hmac_secret() {
        request = request.header(
            "X-Apidedup-Signature",
            compute_hmac_signature(secret.expose_secret(), body),
        );
    }
    request
}

#[allow(clippy::cast_possible_truncation)]
fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

/// Posts detection reports to configured webhook endpoints.
pub struct WebhookNotifier {
    endpoints: Vec<WebhookEndpoint>,
    backend: Arc<dyn WebhookDelivery>,
}

impl WebhookNotifier {
    /// Creates a notifier using the HTTP backend.
    #[must_use]
    pub fn new(endpoints: Vec<WebhookEndpoint>) -> Self {
        Self::with_backend(endpoints, Arc::new(HttpDeliveryBackend::new()))
    }

    /// Creates a notifier with a custom delivery backend.
    #[must_use]
    pub fn with_backend(endpoints: Vec<WebhookEndpoint>, backend: Arc<dyn WebhookDelivery>) -> Self {
        Self { endpoints, backend }
    }

    /// Configured endpoints.
    #[must_use]
    pub fn endpoints(&self) -> &[WebhookEndpoint] {
        &self.endpoints
    }
}

impl Notifier for WebhookNotifier {
    fn name(&self) -> &'static str {
        "webhook"
    }

    #[allow(clippy::cast_precision_loss)]
    fn deliver(&self, report: &DetectionReport) -> Result<()> {
        let payload = NotificationPayload::from_report(report);
        let top_score = report.top_match().map(|r| r.overall_score);
        let mut failed = Vec::new();

        for endpoint in self.endpoints.iter().filter(|e| e.enabled && e.accepts(top_score)) {
            let result = self.backend.deliver(endpoint, &payload)?;
            let outcome = if result.success { "success" } else { "failure" };
            metrics::counter!(
                "webhook_deliveries_total",
                "webhook" => endpoint.name.clone(),
                "result" => outcome
            )
            .increment(1);
            metrics::histogram!("webhook_delivery_duration_ms", "webhook" => endpoint.name.clone())
                .record(result.duration_ms as f64);

            if result.success {
                tracing::debug!(
                    webhook = %endpoint.name,
                    status = ?result.status_code,
                    attempts = result.attempts,
                    "Webhook delivered"
                );
            } else {
                tracing::warn!(
                    webhook = %endpoint.name,
                    status = ?result.status_code,
                    attempts = result.attempts,
                    error = ?result.error,
                    "Webhook delivery failed"
                );
                failed.push(endpoint.name.clone());
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(Error::operation(
                "webhook_deliver",
                format!("delivery failed for: {}", failed.join(", ")),
            ))
        }
    }
}
