//! Compare CLI command.

use super::{OutputFormat, load_api, render_comparison};
use crate::config::AppConfig;
use crate::services::DetectionService;
use std::path::Path;

/// Scores `new_spec` against `existing_spec` structurally.
///
/// # Errors
///
/// Returns an error if either file cannot be read.
pub fn cmd_compare(
    config: &AppConfig,
    new_spec: &Path,
    existing_spec: &Path,
    format: OutputFormat,
) -> anyhow::Result<String> {
    let new_api = load_api(new_spec, None, None)?;
    let existing = load_api(existing_spec, None, None)?;

    let service = DetectionService::structural(config.detection);
    let result = service.compare(&new_api, &existing);
    Ok(render_comparison(&result, format)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_identical_documents() {
        let dir = tempfile::tempdir().unwrap();
        let doc = r#"{"openapi":"3.0.0","info":{"title":"Orders","description":"Track customer orders"},"paths":{"/orders":{"get":{}}},"components":{"schemas":{"Order":{}}}}"#;
        let a = dir.path().join("orders.json");
        let b = dir.path().join("orders-copy.json");
        std::fs::write(&a, doc).unwrap();
        std::fs::write(&b, doc).unwrap();

        let output = cmd_compare(&AppConfig::default(), &a, &b, OutputFormat::Json).unwrap();
        let result: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(result["is_duplicate"], true);
        assert!((result["overall_score"].as_f64().unwrap() - 1.0).abs() < 1e-4);
        assert!(result["scores"].get("semantic").is_none());
    }
}
