//! CLI command definitions.
//!
//! Each subcommand loads `rgm.toml` (when present), applies its flags on top
//! and runs one piece of the red-green-refactor loop.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;

use rgm_core::RgmConfig;

pub mod collect;
pub mod run;
pub mod test;

/// Red Green Machine - test-driven code generation
#[derive(Parser)]
#[command(name = "rgm")]
#[command(version, about = "Red Green Machine - test-driven code generation")]
#[command(long_about = r#"
The Red Green Machine makes a repository's failing tests pass. It collects the
source files, runs the test command, asks a language model to analyze the
failure and implement a fix, then refactors the passing code while keeping the
tests green. Test files are never modified.

COMMANDS:
  run      → Run the full red-green-refactor loop
  test     → Run the test command once and print the verdict
  collect  → List the files a run would send to the model

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments or configuration
  3 - Implementation failed
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full red-green-refactor loop
    Run(run::RunArgs),

    /// Run the test command once
    Test(test::TestArgs),

    /// List the files collected from the repository
    Collect(collect::CollectArgs),
}

/// Load configuration, falling back to defaults when the file is missing.
pub fn load_config(path: &Path) -> Result<RgmConfig> {
    let config = RgmConfig::load(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    debug!(path = %path.display(), "Configuration loaded");
    Ok(config)
}

/// Repository flags shared by `run` and `collect`.
pub fn apply_repository_overrides(
    config: &mut RgmConfig,
    repo: Option<PathBuf>,
    includes: Vec<String>,
    excludes: Vec<String>,
) {
    if let Some(root) = repo {
        config.repository.root = root;
    }
    if !includes.is_empty() {
        config.repository.includes = includes;
    }
    if !excludes.is_empty() {
        config.repository.excludes = excludes;
    }
}
