//! Structured logging configuration.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

/// Default filter directive.
pub const DEFAULT_FILTER: &str = "warn";

/// Filter directive used with `--verbose`.
pub const VERBOSE_FILTER: &str = "apidedup=debug,info";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(Error::InvalidInput(format!("unknown log format: {other}"))),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pretty => write!(f, "pretty"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Logging configuration (`[logging]`).
///
/// # Environment Variables
///
/// | Variable | Description |
/// |----------|-------------|
/// | `APIDEDUP_LOG` | Filter directive, takes precedence over `RUST_LOG` |
/// | `RUST_LOG` | Filter directive |
/// | `APIDEDUP_LOG_FORMAT` | `pretty` or `json` |
/// | `APIDEDUP_LOG_FILE` | Append logs to this file instead of stderr |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
    /// Filter directive used when no environment filter is set.
    #[serde(default = "default_filter")]
    pub filter: String,
    /// Optional log file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            filter: default_filter(),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Applies `APIDEDUP_LOG_FORMAT` and `APIDEDUP_LOG_FILE`.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(format) = std::env::var("APIDEDUP_LOG_FORMAT")
            .ok()
            .and_then(|v| v.parse::<LogFormat>().ok())
        {
            self.format = format;
        }
        if let Some(file) = std::env::var("APIDEDUP_LOG_FILE")
            .ok()
            .filter(|v| !v.trim().is_empty())
        {
            self.file = Some(PathBuf::from(file));
        }
        self
    }

    /// Resolves the effective filter directive.
    ///
    /// `verbose` wins, then `APIDEDUP_LOG`, then `RUST_LOG`, then the
    /// configured filter.
    #[must_use]
    pub fn directive(&self, verbose: bool) -> String {
        if verbose {
            return VERBOSE_FILTER.to_string();
        }
        std::env::var("APIDEDUP_LOG")
            .ok()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| self.filter.clone())
    }

    /// Builds the subscriber filter, falling back to [`DEFAULT_FILTER`] on
    /// an unparseable directive.
    #[must_use]
    pub fn env_filter(&self, verbose: bool) -> EnvFilter {
        let directive = self.directive(verbose);
        EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

fn default_filter() -> String {
    DEFAULT_FILTER.to_string()
}
