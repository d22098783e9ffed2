//! Run command - Drive the red-green-refactor loop.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::info;

use rgm_agents::{event_channel, AgentGraph, RunEvent, RunServices};
use rgm_core::{AgentId, RunOutcome, DEFAULT_CONFIG_FILE};
use rgm_llm::create_generator;
use rgm_runner::CommandTestRunner;

use super::{apply_repository_overrides, load_config};

/// The run ended without passing tests.
#[derive(Debug, Error)]
#[error("Implementation failed")]
pub struct ImplementationFailed;

#[derive(Args)]
pub struct RunArgs {
    /// Configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Repository root (overrides repository.root)
    #[arg(short, long)]
    pub repo: Option<PathBuf>,

    /// Model identifier
    #[arg(short, long)]
    pub model: Option<String>,

    /// File name pattern to collect (repeatable, replaces configured includes)
    #[arg(long)]
    pub include: Vec<String>,

    /// Path segment to skip (repeatable, replaces configured excludes)
    #[arg(long)]
    pub exclude: Vec<String>,

    /// Command that runs the test suite
    #[arg(short, long)]
    pub test_command: Option<String>,

    /// Generation provider (gemini or openai)
    #[arg(short, long)]
    pub provider: Option<String>,

    /// Save the run log as JSON
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

pub async fn execute(args: RunArgs) -> Result<()> {
    let mut config = load_config(&args.config)?;
    apply_repository_overrides(&mut config, args.repo, args.include, args.exclude);
    if let Some(model) = args.model {
        config.model = model;
    }
    if let Some(command) = args.test_command {
        config.repository.test_command = command;
    }
    if let Some(provider) = args.provider {
        config.generation.provider = provider;
    }
    config.validate().context("Invalid configuration")?;

    let generator =
        create_generator(&config.generation).context("Failed to set up generation provider")?;
    let services = RunServices::from_config(&config, Arc::new(CommandTestRunner::new()), generator);

    let mut graph = AgentGraph::standard(&config.model, config.repository(), services)?;
    if let Some(path) = &args.log_file {
        graph = graph.with_log_path(path);
    }

    info!(
        root = %config.repository.root.display(),
        model = %config.model,
        provider = %config.generation.provider,
        "Starting red-green-refactor run"
    );
    println!("🚦 Red Green Machine");
    println!("   Repository: {}", config.repository.root.display());
    println!("   Model:      {}", config.model);
    println!();

    let (progress, events) = event_channel();
    let renderer = tokio::spawn(render_events(events));
    let result = graph.run(&progress).await;
    drop(progress);
    renderer.await.context("Event renderer stopped unexpectedly")?;

    if let Some(path) = &args.log_file {
        println!("📝 Run log saved to {}", path.display());
    }

    let outcome = result?;
    report(&outcome)
}

fn report(outcome: &RunOutcome) -> Result<()> {
    println!();
    if outcome.failed {
        println!("❌ Implementation failed. Tests are still failing.");
        return Err(ImplementationFailed.into());
    }
    if outcome.implemented_file {
        println!("✅ Tests pass. Implementation written and refactored.");
    } else {
        println!("✅ Tests already pass. Nothing to do.");
    }
    Ok(())
}

async fn render_events(mut events: UnboundedReceiver<RunEvent>) {
    let mut streaming: Option<AgentId> = None;

    while let Some(event) = events.recv().await {
        match event {
            RunEvent::AgentStarted { step, agent } => {
                end_stream(&mut streaming);
                println!("▶ [{}] {}", step, agent.description());
            }
            RunEvent::Progress { agent, chunk } => {
                if streaming != Some(agent) {
                    end_stream(&mut streaming);
                    streaming = Some(agent);
                }
                print!("{}", chunk);
                let _ = std::io::stdout().flush();
            }
            RunEvent::Routed { to, display, .. } => {
                end_stream(&mut streaming);
                if let Some(text) = display {
                    println!("{}", text.trim_end());
                }
                println!("   → {}", to);
            }
            RunEvent::Finished { display, .. } => {
                end_stream(&mut streaming);
                if let Some(text) = display {
                    println!("🏁 {}", text);
                }
            }
        }
    }
    end_stream(&mut streaming);
}

fn end_stream(streaming: &mut Option<AgentId>) {
    if streaming.take().is_some() {
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_maps_failure() {
        let err = report(&RunOutcome::failed()).unwrap_err();
        assert!(err.downcast_ref::<ImplementationFailed>().is_some());
        report(&RunOutcome::implemented()).unwrap();
        report(&RunOutcome::already_passing()).unwrap();
    }

    #[tokio::test]
    async fn test_renderer_drains_until_closed() {
        let (progress, events) = event_channel();
        progress.chunk(AgentId::Analyst, "thinking");
        progress.emit(RunEvent::Finished {
            outcome: RunOutcome::already_passing(),
            display: Some("Tests already pass".to_string()),
        });
        drop(progress);
        render_events(events).await;
    }
}
