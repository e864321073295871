//! Notification payloads.

use crate::models::DetectionReport;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt::Write as _;

/// Event type carried by every detection notification.
pub const DUPLICATES_DETECTED: &str = "duplicates_detected";

/// Maximum matches listed in a Slack message.
const SLACK_MAX_MATCHES: usize = 5;

type HmacSha256 = Hmac<Sha256>;

/// One flagged match in a payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSummary {
    /// Existing API name.
    pub api_name: String,
    /// Existing API identifier.
    pub api_id: String,
    /// Fused overall score.
    pub overall_score: f32,
    /// Whether semantic scoring contributed.
    pub used_semantic: bool,
    /// Advisory messages.
    pub recommendations: Vec<String>,
}

/// Report summary carried in `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Name of the triggering API.
    pub api_name: String,
    /// Identifier of the triggering API.
    pub api_id: String,
    /// Trigger kind.
    pub trigger: String,
    /// Scoring mode.
    pub mode: String,
    /// Threshold used.
    pub threshold: f32,
    /// Candidates examined.
    pub total_analyzed: usize,
    /// Flagged matches, best first.
    pub matches: Vec<MatchSummary>,
}

impl ReportSummary {
    fn from_report(report: &DetectionReport) -> Self {
        Self {
            api_name: report.api.name.clone(),
            api_id: report.api.id.to_string(),
            trigger: report.trigger.to_string(),
            mode: report.mode.to_string(),
            threshold: report.threshold,
            total_analyzed: report.total_analyzed,
            matches: report
                .results
                .iter()
                .map(|r| MatchSummary {
                    api_name: r.existing.name.clone(),
                    api_id: r.existing.id.to_string(),
                    overall_score: r.overall_score,
                    used_semantic: r.used_semantic(),
                    recommendations: r.recommendations.clone(),
                })
                .collect(),
        }
    }
}

/// Webhook payload envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationPayload {
    /// Unique delivery identifier.
    pub event_id: String,
    /// Event type.
    pub event_type: String,
    /// When the payload was built.
    pub timestamp: DateTime<Utc>,
    /// Report summary.
    pub data: ReportSummary,
}

impl NotificationPayload {
    /// Builds a payload from a detection report.
    #[must_use]
    pub fn from_report(report: &DetectionReport) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            event_type: DUPLICATES_DETECTED.to_string(),
            timestamp: Utc::now(),
            data: ReportSummary::from_report(report),
        }
    }

    /// Serializes to the default JSON format.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Serializes to Slack Block Kit JSON.
    #[must_use]
    pub fn to_slack_json(&self) -> String {
        let data = &self.data;
        let headline = if data.matches.is_empty() {
            format!("No duplicates found for *{}*", data.api_name)
        } else {
            format!(
                "{} potential duplicate(s) found for *{}*",
                data.matches.len(),
                data.api_name
            )
        };

        let mut details = String::new();
        for m in data.matches.iter().take(SLACK_MAX_MATCHES) {
            let _ = writeln!(
                details,
                "- *{}*: {:.0}% similar",
                m.api_name,
                m.overall_score * 100.0
            );
        }
        if data.matches.len() > SLACK_MAX_MATCHES {
            let _ = writeln!(details, "_and {} more_", data.matches.len() - SLACK_MAX_MATCHES);
        }

        let mut blocks = vec![
            serde_json::json!({
                "type": "header",
                "text": { "type": "plain_text", "text": "API duplicate check" }
            }),
            serde_json::json!({
                "type": "section",
                "text": { "type": "mrkdwn", "text": headline }
            }),
        ];
        if !details.is_empty() {
            blocks.push(serde_json::json!({
                "type": "section",
                "text": { "type": "mrkdwn", "text": details.trim_end() }
            }));
        }
        blocks.push(serde_json::json!({
            "type": "context",
            "elements": [{
                "type": "mrkdwn",
                "text": format!(
                    "Trigger: {} | Mode: {} | Analyzed: {} | {}",
                    data.trigger,
                    data.mode,
                    data.total_analyzed,
                    self.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
                )
            }]
        }));

        serde_json::json!({
            "text": headline,
            "blocks": blocks
        })
        .to_string()
    }
}

/// Computes `sha256=<hex>` for a payload.
///
/// Returns an empty string if the key is rejected, which HMAC never does
/// for SHA-256.
#[must_use]
pub fn compute_hmac_signature(secret: &str, payload: &str) -> String {
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return String::new();
    };
    mac.update(payload.as_bytes());
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}

/// Verifies a `sha256=<hex>` signature in constant time.
#[must_use]
pub fn verify_hmac_signature(secret: &str, payload: &str, signature: &str) -> bool {
    let expected = compute_hmac_signature(secret, payload);
    !expected.is_empty() && constant_time_eq(expected.as_bytes(), signature.as_bytes())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ApiRecord, ComparisonResult, ComponentScores, DetectionMode, TriggerKind};

    fn report(matches: usize) -> DetectionReport {
        let api = ApiRecord::new("pets-v2", "pets-v2");
        let results = (0..matches)
            .map(|i| ComparisonResult {
                new_api: api.clone(),
                existing: ApiRecord::new(format!("id-{i}"), format!("existing-{i}")),
                scores: ComponentScores::default(),
                overall_score: 0.9,
                is_duplicate: true,
                matched_endpoints: Vec::new(),
                recommendations: vec!["Contact the owner".to_string()],
            })
            .collect();
        DetectionReport {
            api,
            trigger: TriggerKind::Created,
            results,
            total_analyzed: 10,
            threshold: 0.75,
            mode: DetectionMode::Structural,
            generated_at: Utc::now(),
        }
    }

    #[test]
    fn test_default_json_envelope() {
        let payload = NotificationPayload::from_report(&report(2));
        let value: serde_json::Value = serde_json::from_str(&payload.to_json()).unwrap();

        assert_eq!(value["event_type"], "duplicates_detected");
        assert_eq!(value["data"]["api_name"], "pets-v2");
        assert_eq!(value["data"]["trigger"], "created");
        assert_eq!(value["data"]["matches"].as_array().unwrap().len(), 2);
        assert!(uuid::Uuid::parse_str(value["event_id"].as_str().unwrap()).is_ok());
    }

    #[test]
    fn test_slack_json_truncates_matches() {
        let payload = NotificationPayload::from_report(&report(7));
        let value: serde_json::Value = serde_json::from_str(&payload.to_slack_json()).unwrap();

        assert!(value["text"].as_str().unwrap().starts_with("7 potential duplicate(s)"));
        let blocks = value["blocks"].as_array().unwrap();
        assert_eq!(blocks[0]["type"], "header");
        let details = blocks[2]["text"]["text"].as_str().unwrap();
        assert_eq!(details.matches("% similar").count(), 5);
        assert!(details.contains("and 2 more"));
    }

    #[test]
    fn test_slack_json_without_matches() {
        let payload = NotificationPayload::from_report(&report(0));
        let value: serde_json::Value = serde_json::from_str(&payload.to_slack_json()).unwrap();
        assert!(value["text"].as_str().unwrap().starts_with("No duplicates"));
        assert_eq!(value["blocks"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_hmac_signature() {
        let signature = compute_hmac_signature("secret", "{\"a\":1}");
        assert!(signature.starts_with("sha256="));
        assert_eq!(signature.len(), "sha256=".len() + 64);
        assert_eq!(signature, compute_hmac_signature("secret", "{\"a\":1}"));
        assert_ne!(signature, compute_hmac_signature("other", "{\"a\":1}"));

        assert!(verify_hmac_signature("secret", "{\"a\":1}", &signature));
        assert!(!verify_hmac_signature("secret", "{\"a\":2}", &signature));
    }
}
