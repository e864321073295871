//! Binary entry point for apidedup.
//!
//! This binary provides the CLI interface for near-duplicate API detection.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use apidedup::AppConfig;
use apidedup::cli::{self, DetectArgs, OutputFormat};
use apidedup::observability;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

/// apidedup - Near-duplicate API detection for API catalogs.
#[derive(Parser)]
#[command(name = "apidedup")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Check a specification against the catalog.
    Detect(DetectArgs),

    /// Compare two specifications.
    Compare {
        /// The new API's specification.
        new_spec: PathBuf,

        /// The existing API's specification.
        existing_spec: PathBuf,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Embed every catalog API into the embedding store.
    Index {
        /// Catalog directory.
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Show the effective configuration.
    Config,
}

/// Main entry point.
fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    if let Err(e) = observability::init(&config.logging, cli.verbose) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run_command(cli.command, &config) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        },
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command and returns its output.
fn run_command(command: Commands, config: &AppConfig) -> anyhow::Result<String> {
    match command {
        Commands::Detect(args) => cli::cmd_detect(config, &args),
        Commands::Compare {
            new_spec,
            existing_spec,
            format,
        } => cli::cmd_compare(config, &new_spec, &existing_spec, format),
        Commands::Index { catalog } => cli::cmd_index(config, catalog.as_deref()),
        Commands::Config => Ok(cli::cmd_config(config)),
    }
}
