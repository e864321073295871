//! Detect CLI command.

use super::{OutputFormat, load_api, render_report};
use crate::catalog::DirectoryCatalog;
use crate::config::AppConfig;
use crate::models::TriggerKind;
use crate::services::BackendFactory;
use anyhow::Context;
use std::path::PathBuf;

/// Arguments for `apidedup detect`.
#[derive(Debug, Clone, clap::Args)]
pub struct DetectArgs {
    /// Specification file of the API to check.
    pub spec_file: PathBuf,

    /// API name (defaults to the file stem).
    #[arg(long)]
    pub name: Option<String>,

    /// API id (defaults to the name).
    #[arg(long)]
    pub id: Option<String>,

    /// Catalog directory.
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Similarity threshold in [0, 1].
    #[arg(short, long)]
    pub threshold: Option<f32>,

    /// Use embeddings when an embedder is configured.
    #[arg(long, conflicts_with = "structural")]
    pub semantic: bool,

    /// Use structural scoring only.
    #[arg(long)]
    pub structural: bool,

    /// What caused the check: created, updated or manual.
    #[arg(long, default_value = "created")]
    pub trigger: TriggerKind,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Send the report to configured notifiers.
    #[arg(long)]
    pub notify: bool,
}

impl DetectArgs {
    /// Applies command-line overrides to `config`.
    fn apply(&self, config: &AppConfig) -> AppConfig {
        let mut config = config.clone();
        if let Some(threshold) = self.threshold {
            config.detection = config.detection.with_threshold(threshold);
        }
        if self.semantic {
            config.detection = config.detection.with_semantic_enabled(true);
        }
        if self.structural {
            config.detection = config.detection.with_semantic_enabled(false);
        }
        if let Some(catalog) = &self.catalog {
            config.catalog_dir = Some(catalog.clone());
        }
        config
    }
}

/// Runs duplicate detection for one specification file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the catalog is unavailable.
pub fn cmd_detect(config: &AppConfig, args: &DetectArgs) -> anyhow::Result<String> {
    let config = args.apply(config);
    let api = load_api(&args.spec_file, args.name.as_deref(), args.id.as_deref())?;

    let catalog = DirectoryCatalog::new(config.resolved_catalog_dir());
    let service = BackendFactory::create_service(&config);
    let report = service
        .detect(&catalog, &api, args.trigger)
        .with_context(|| format!("detecting duplicates of '{}'", api.name))?;

    if args.notify {
        let summary = BackendFactory::create_dispatcher(&config).dispatch(&report);
        tracing::info!(
            delivered = summary.delivered,
            failed = summary.failed,
            skipped = summary.skipped,
            "Notifications dispatched"
        );
    }

    Ok(render_report(&report, args.format)?)
}
