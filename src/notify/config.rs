//! Notification configuration types.
//!
//! Webhooks are configured under `[[webhooks]]`:
//!
//! ```toml
//! [[webhooks]]
//! name = "catalog-team"
//! url = "https://hooks.example.com/apidedup"
//! format = "slack"
//! min_score = 0.8
//!
//! [webhooks.auth]
//! type = "hmac"
//! secret = "change-me"
//!
//! [webhooks.retry]
//! max_retries = 3
//! base_delay_ms = 1000
//! timeout_secs = 30
//! ```
//!
//! Log-based alerts are configured under `[alerts]`.

use crate::{Error, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;

/// Payload format for webhook delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadFormat {
    /// JSON with `event_id`, `event_type`, timestamp and report data.
    #[default]
    Default,
    /// Slack-compatible format with a text field and blocks.
    Slack,
}

impl FromStr for PayloadFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "default" | "json" => Ok(Self::Default),
            "slack" => Ok(Self::Slack),
            other => Err(Error::InvalidInput(format!("unknown payload format: {other}"))),
        }
    }
}

/// Configuration for a single webhook endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEndpoint {
    /// Unique name for this webhook.
    pub name: String,

    /// Target URL.
    pub url: String,

    /// Authentication configuration.
    #[serde(default)]
    pub auth: WebhookAuth,

    /// Whether this webhook is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Only notify when the best match reaches this overall score.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_score: Option<f32>,

    /// Retry configuration.
    #[serde(default)]
    pub retry: RetryConfig,

    /// Payload format.
    #[serde(default)]
    pub format: PayloadFormat,
}

impl WebhookEndpoint {
    /// Creates an enabled endpoint with no authentication.
    #[must_use]
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            auth: WebhookAuth::None,
            enabled: true,
            min_score: None,
            retry: RetryConfig::default(),
            format: PayloadFormat::Default,
        }
    }

    /// Sets the authentication.
    #[must_use]
    pub fn with_auth(mut self, auth: WebhookAuth) -> Self {
        self.auth = auth;
        self
    }

    /// Sets the retry configuration.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Sets the payload format.
    #[must_use]
    pub const fn with_format(mut self, format: PayloadFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets the minimum top score.
    #[must_use]
    pub const fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = Some(min_score);
        self
    }

    /// Returns true if a report whose best score is `top_score` should be sent.
    #[must_use]
    pub fn accepts(&self, top_score: Option<f32>) -> bool {
        match (self.min_score, top_score) {
            (None, _) => true,
            (Some(min), Some(top)) => top >= min,
            (Some(_), None) => false,
        }
    }
}

/// Authentication configuration for a webhook.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WebhookAuth {
    /// Adds `Authorization: Bearer <token>`.
    Bearer {
        /// The bearer token.
        #[serde(with = "secret_string_serde")]
        token: SecretString,
    },

    /// Adds `X-Apidedup-Signature: sha256=<signature>`.
    Hmac {
        /// The shared secret for HMAC signing.
        #[serde(with = "secret_string_serde")]
        secret: SecretString,
    },

    /// Both headers.
    Both {
        /// The bearer token.
        #[serde(with = "secret_string_serde")]
        token: SecretString,
        /// The HMAC secret.
        #[serde(with = "secret_string_serde")]
        secret: SecretString,
    },

    /// No authentication.
    #[default]
    None,
}

impl WebhookAuth {
    /// Returns the bearer token if configured.
    #[must_use]
    pub const fn bearer_token(&self) -> Option<&SecretString> {
        match self {
            Self::Bearer { token } | Self::Both { token, .. } => Some(token),
            _ => None,
        }
    }

    /// Returns the HMAC secret if configured.
    #[must_use]
    pub const fn hmac_secret(&self) -> Option<&SecretString> {
        match self {
            Self::Hmac { secret } | Self::Both { secret, .. } => Some(secret),
            _ => None,
        }
    }

    fn validate(&self, webhook_name: &str) -> Result<()> {
        let empty = |s: &SecretString| s.expose_secret().is_empty();
        match self {
            Self::Bearer { token } if empty(token) => Err(Error::InvalidInput(format!(
                "Webhook '{webhook_name}': Bearer token cannot be empty"
            ))),
            Self::Hmac { secret } if empty(secret) => Err(Error::InvalidInput(format!(
                "Webhook '{webhook_name}': HMAC secret cannot be empty"
            ))),
            Self::Both { token, secret } if empty(token) || empty(secret) => {
                Err(Error::InvalidInput(format!(
                    "Webhook '{webhook_name}': Bearer token and HMAC secret cannot be empty"
                )))
            },
            _ => Ok(()),
        }
    }
}

/// Retry configuration for webhook delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (default: 3).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay in milliseconds for exponential backoff (default: 1000).
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Request timeout in seconds (default: 30).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl RetryConfig {
    /// Delay before retrying after `attempt` (1-based):
    /// `base_delay_ms * 2^(attempt - 1)`, exponent capped at 10.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> u64 {
        if attempt == 0 {
            return 0;
        }
        self.base_delay_ms
            .saturating_mul(1 << (attempt - 1).min(10))
    }
}

/// Log-based alert configuration (`[alerts]`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Emit log alerts for flagged duplicates.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Only alert on results at or above this overall score.
    #[serde(default)]
    pub min_score: f32,

    /// Also dispatch reports with no duplicates.
    #[serde(default)]
    pub notify_when_empty: bool,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_score: 0.0,
            notify_when_empty: false,
        }
    }
}

/// Validates a webhook list.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if names repeat, a URL is not HTTPS
/// (except localhost), or an auth secret is empty.
pub fn validate_webhooks(webhooks: &[WebhookEndpoint]) -> Result<()> {
    let mut names = HashSet::new();

    for webhook in webhooks {
        if !names.insert(&webhook.name) {
            return Err(Error::InvalidInput(format!(
                "Duplicate webhook name: {}",
                webhook.name
            )));
        }

        let local = webhook.url.starts_with("http://localhost")
            || webhook.url.starts_with("http://127.0.0.1");
        if !webhook.url.starts_with("https://") && !local {
            return Err(Error::InvalidInput(format!(
                "Webhook URL must use HTTPS (except localhost): {}",
                webhook.url
            )));
        }

        webhook.auth.validate(&webhook.name)?;
    }

    Ok(())
}

const fn default_true() -> bool {
    true
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_base_delay_ms() -> u64 {
    1000
}

const fn default_timeout_secs() -> u64 {
    30
}

/// Serde module for `SecretString` serialization.
mod secret_string_serde {
    use secrecy::SecretString;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(_secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str("***REDACTED***")
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(SecretString::from(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_delay() {
        let config = RetryConfig::default();
        assert_eq!(config.delay_for_attempt(0), 0);
        assert_eq!(config.delay_for_attempt(1), 1000);
        assert_eq!(config.delay_for_attempt(2), 2000);
        assert_eq!(config.delay_for_attempt(3), 4000);
        assert_eq!(config.delay_for_attempt(40), 1000 * 1024);
    }

    #[test]
    fn test_deserialize_from_toml() {
        let toml = r#"
name = "team"
url = "https://hooks.example.com/x"
format = "slack"
min_score = 0.8

[auth]
type = "both"
token = "t"
secret = "s"

[retry]
max_retries = 1
"#;
        let endpoint: WebhookEndpoint = toml::from_str(toml).unwrap();
        assert!(endpoint.enabled);
        assert_eq!(endpoint.format, PayloadFormat::Slack);
        assert_eq!(endpoint.retry.max_retries, 1);
        assert_eq!(endpoint.retry.base_delay_ms, 1000);
        assert_eq!(endpoint.auth.bearer_token().unwrap().expose_secret(), "t");
        assert_eq!(endpoint.auth.hmac_secret().unwrap().expose_secret(), "s");
    }

    #[test]
    fn test_secrets_redacted_when_serialized() {
        let endpoint = WebhookEndpoint::new("x", "https://example.com").with_auth(WebhookAuth::Hmac {
            secret: SecretString::from("super-secret".to_string()),
        });
        let json = serde_json::to_string(&endpoint).unwrap();
        assert!(!json.contains("super-secret"));
        assert!(json.contains("REDACTED"));
    }

    #[test]
    fn test_validate_webhooks() {
        let ok = WebhookEndpoint::new("a", "https://example.com");
        let local = WebhookEndpoint::new("b", "http://localhost:9000/hook");
        assert!(validate_webhooks(&[ok.clone(), local]).is_ok());

        assert!(validate_webhooks(&[ok.clone(), ok.clone()]).is_err());
        assert!(validate_webhooks(&[WebhookEndpoint::new("c", "http://example.com")]).is_err());

        let empty_secret = ok.with_auth(WebhookAuth::Hmac {
            secret: SecretString::from(String::new()),
        });
        assert!(validate_webhooks(&[empty_secret]).is_err());
    }

    #[test]
    fn test_accepts_min_score() {
        let endpoint = WebhookEndpoint::new("a", "https://example.com");
        assert!(endpoint.accepts(None));

        let endpoint = endpoint.with_min_score(0.8);
        assert!(endpoint.accepts(Some(0.8)));
        assert!(!endpoint.accepts(Some(0.79)));
        assert!(!endpoint.accepts(None));
    }

    #[test]
    fn test_payload_format_parse() {
        assert_eq!("Slack".parse::<PayloadFormat>().unwrap(), PayloadFormat::Slack);
        assert_eq!("json".parse::<PayloadFormat>().unwrap(), PayloadFormat::Default);
        assert!("teams".parse::<PayloadFormat>().is_err());
    }
}
