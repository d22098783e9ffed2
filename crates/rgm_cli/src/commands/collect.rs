//! Collect command - Show what a run would load from the repository.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use rgm_core::{is_test_path, RepositorySnapshot, DEFAULT_CONFIG_FILE};

use super::{apply_repository_overrides, load_config};

#[derive(Args)]
pub struct CollectArgs {
    /// Configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Repository root
    #[arg(short, long)]
    pub repo: Option<PathBuf>,

    /// File name pattern to collect (repeatable)
    #[arg(long)]
    pub include: Vec<String>,

    /// Path segment to skip (repeatable)
    #[arg(long)]
    pub exclude: Vec<String>,
}

pub async fn execute(args: CollectArgs) -> Result<()> {
    let mut config = load_config(&args.config)?;
    apply_repository_overrides(&mut config, args.repo, args.include, args.exclude);
    config.validate().context("Invalid configuration")?;

    let repo = config.repository();
    let snapshot = RepositorySnapshot::collect(&repo)?;

    println!("📂 {}", repo.root.display());
    let mut total_bytes = 0;
    for file in snapshot.files() {
        total_bytes += file.content.len();
        let marker = if is_test_path(&file.path.to_string_lossy()) {
            " (test, read-only)"
        } else {
            ""
        };
        println!(
            "   {} ({} bytes){}",
            file.path.display(),
            file.content.len(),
            marker
        );
    }
    println!();
    println!("   {} files, {} bytes", snapshot.len(), total_bytes);

    Ok(())
}
