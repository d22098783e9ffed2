//! Red Green Machine CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments or configuration
//! - 3: Implementation failed

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rgm_agents::AgentError;
use rgm_core::CoreError;
use rgm_llm::LlmError;

mod commands;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const IMPLEMENTATION_FAILED: u8 = 3;
}

const DEFAULT_FILTER: &str = "rgm=info,warn";

fn init_logging(verbose: bool, json: bool) {
    let filter = if verbose {
        EnvFilter::new("rgm=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    };

    let registry = tracing_subscriber::registry().with(filter);
    let result = if json {
        registry.with(fmt::layer().json().with_writer(std::io::stderr)).try_init()
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
    };

    if result.is_err() {
        // Logging already initialized, continue
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.json_logs);

    let result = match cli.command {
        Commands::Run(args) => commands::run::execute(args).await,
        Commands::Test(args) => commands::test::execute(args).await,
        Commands::Collect(args) => commands::collect::execute(args).await,
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

fn is_invalid_input(core: &CoreError) -> bool {
    matches!(
        core,
        CoreError::RootNotFound(_) | CoreError::InvalidConfig(_) | CoreError::ConfigParse(_)
    )
}

fn is_invalid_llm_setup(llm: &LlmError) -> bool {
    matches!(llm, LlmError::NotConfigured(_) | LlmError::UnknownProvider(_))
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    if e.downcast_ref::<commands::run::ImplementationFailed>().is_some() {
        return ExitCodes::IMPLEMENTATION_FAILED;
    }
    if let Some(core) = e.downcast_ref::<CoreError>() {
        if is_invalid_input(core) {
            return ExitCodes::INVALID_ARGS;
        }
    }
    if let Some(llm) = e.downcast_ref::<LlmError>() {
        if is_invalid_llm_setup(llm) {
            return ExitCodes::INVALID_ARGS;
        }
    }
    match e.downcast_ref::<AgentError>() {
        Some(AgentError::Core(core)) if is_invalid_input(core) => ExitCodes::INVALID_ARGS,
        Some(AgentError::Llm(llm)) if is_invalid_llm_setup(llm) => ExitCodes::INVALID_ARGS,
        _ => ExitCodes::GENERAL_ERROR,
    }
}
