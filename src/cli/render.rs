//! Text and JSON rendering of results.

use super::OutputFormat;
use crate::models::{ComparisonResult, ComponentScores, DetectionReport};
use std::fmt::Write as _;

fn pct(score: f32) -> String {
    format!("{:.1}%", score * 100.0)
}

fn write_scores(out: &mut String, scores: &ComponentScores) {
    let _ = write!(
        out,
        "   name {}  description {}  path {}  schema {}",
        pct(scores.name),
        pct(scores.description),
        pct(scores.path),
        pct(scores.schema)
    );
    if let Some(semantic) = scores.semantic {
        let _ = write!(out, "  semantic {}", pct(semantic));
    }
    out.push('\n');
}

fn write_details(out: &mut String, result: &ComparisonResult) {
    write_scores(out, &result.scores);

    if !result.matched_endpoints.is_empty() {
        let _ = writeln!(out, "   Matched endpoints:");
        for m in &result.matched_endpoints {
            let _ = writeln!(
                out,
                "     {} <-> {}  ({})",
                m.new_endpoint.signature(),
                m.existing_endpoint.signature(),
                m.reason
            );
        }
    }

    if !result.recommendations.is_empty() {
        let _ = writeln!(out, "   Recommendations:");
        for r in &result.recommendations {
            let _ = writeln!(out, "     - {r}");
        }
    }
}

/// Renders a detection report.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render_report(report: &DetectionReport, format: OutputFormat) -> serde_json::Result<String> {
    if format == OutputFormat::Json {
        return serde_json::to_string_pretty(report);
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "Duplicate check for '{}' (trigger: {}, mode: {})",
        report.api.name, report.trigger, report.mode
    );
    let _ = writeln!(
        out,
        "Analyzed {} API(s), threshold {}",
        report.total_analyzed,
        pct(report.threshold)
    );

    if report.results.is_empty() {
        let _ = writeln!(out, "\nNo duplicates found.");
        return Ok(out.trim_end().to_string());
    }

    for (i, result) in report.results.iter().enumerate() {
        let _ = writeln!(
            out,
            "\n{}. {}  ({} overall)",
            i + 1,
            result.existing.display_name(),
            pct(result.overall_score)
        );
        write_details(&mut out, result);
    }
    Ok(out.trim_end().to_string())
}

/// Renders a pairwise comparison.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render_comparison(result: &ComparisonResult, format: OutputFormat) -> serde_json::Result<String> {
    if format == OutputFormat::Json {
        return serde_json::to_string_pretty(result);
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} vs {}: {} overall ({})",
        result.new_api.display_name(),
        result.existing.display_name(),
        pct(result.overall_score),
        if result.is_duplicate { "duplicate" } else { "distinct" }
    );
    write_details(&mut out, result);
    Ok(out.trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ApiRecord, DetectionMode, Endpoint, EndpointMatch, TriggerKind};

    fn result() -> ComparisonResult {
        let endpoint = Endpoint::new("get", "/pets");
        ComparisonResult {
            new_api: ApiRecord::new("pets-v2", "pets-v2"),
            existing: ApiRecord::new("petstore", "petstore").with_title("Pet Store"),
            scores: ComponentScores {
                name: 0.5,
                description: 0.25,
                path: 1.0,
                schema: 1.0,
                semantic: Some(0.9),
            },
            overall_score: 0.8,
            is_duplicate: true,
            matched_endpoints: vec![EndpointMatch {
                new_endpoint: endpoint.clone(),
                existing_endpoint: endpoint,
                score: 1.0,
                reason: "identical route GET /pets".to_string(),
            }],
            recommendations: vec!["Contact the owner of 'petstore'.".to_string()],
        }
    }

    fn report(results: Vec<ComparisonResult>) -> DetectionReport {
        DetectionReport {
            api: ApiRecord::new("pets-v2", "pets-v2"),
            trigger: TriggerKind::Created,
            results,
            total_analyzed: 3,
            threshold: 0.75,
            mode: DetectionMode::Semantic,
            generated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_text_report() {
        let text = render_report(&report(vec![result()]), OutputFormat::Text).unwrap();
        assert!(text.starts_with("Duplicate check for 'pets-v2' (trigger: created, mode: semantic)"));
        assert!(text.contains("Analyzed 3 API(s), threshold 75.0%"));
        assert!(text.contains("1. Pet Store  (80.0% overall)"));
        assert!(text.contains("semantic 90.0%"));
        assert!(text.contains("GET /pets <-> GET /pets"));
        assert!(text.contains("- Contact the owner"));
    }

    #[test]
    fn test_text_report_empty() {
        let text = render_report(&report(Vec::new()), OutputFormat::Text).unwrap();
        assert!(text.ends_with("No duplicates found."));
    }

    #[test]
    fn test_json_report() {
        let json = render_report(&report(vec![result()]), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["mode"], "semantic");
        assert_eq!(value["results"][0]["existing"]["name"], "petstore");
    }

    #[test]
    fn test_text_comparison() {
        let text = render_comparison(&result(), OutputFormat::Text).unwrap();
        assert!(text.starts_with("pets-v2 vs Pet Store: 80.0% overall (duplicate)"));
    }
}
