//! Test command - Run the test suite once.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use rgm_core::{Verdict, DEFAULT_CONFIG_FILE};
use rgm_runner::{CommandTestRunner, TestRunner};

use super::load_config;

#[derive(Args)]
pub struct TestArgs {
    /// Configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Repository root
    #[arg(short, long)]
    pub repo: Option<PathBuf>,

    /// Command that runs the test suite
    #[arg(short, long)]
    pub test_command: Option<String>,

    /// Print the full test output
    #[arg(long)]
    pub show_output: bool,
}

pub async fn execute(args: TestArgs) -> Result<()> {
    let mut config = load_config(&args.config)?;
    if let Some(root) = args.repo {
        config.repository.root = root;
    }
    if let Some(command) = args.test_command {
        config.repository.test_command = command;
    }
    config.validate().context("Invalid configuration")?;

    let repo = config.repository();
    if !repo.root.is_dir() {
        return Err(rgm_core::CoreError::RootNotFound(repo.root.clone()).into());
    }

    info!(root = %repo.root.display(), command = %repo.test_command, "Running tests");
    println!("🧪 Running `{}` in {}", repo.test_command, repo.root.display());

    let run = CommandTestRunner::new()
        .run(&repo)
        .await
        .context("Failed to run test command")?;
    let verdict = run.verdict(&repo.failure_markers);

    if args.show_output || verdict == Verdict::Fail {
        println!("{}", run.output.trim_end());
    }
    println!();
    println!(
        "   Exit code: {}",
        run.exit_code
            .map(|c| c.to_string())
            .unwrap_or_else(|| "none".to_string())
    );
    println!("   Duration:  {} ms", run.duration_ms);

    match verdict {
        Verdict::Pass => {
            println!("✅ Tests pass");
            Ok(())
        }
        Verdict::Fail => {
            println!("❌ Tests fail");
            anyhow::bail!("Test suite reported failures")
        }
    }
}
