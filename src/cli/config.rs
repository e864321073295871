//! Config CLI command.

use crate::config::AppConfig;

/// Renders the effective configuration with secrets redacted.
#[must_use]
pub fn cmd_config(config: &AppConfig) -> String {
    config.to_string()
}
