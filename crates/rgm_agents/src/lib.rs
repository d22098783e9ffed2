//! # rgm_agents
//!
//! The agent graph of the Red Green Machine.
//!
//! A run walks a fixed graph of agents that hand off to each other through
//! explicit [`Transition`]s:
//!
//! | Agent | Input | Hands off to |
//! |-------|-------|--------------|
//! | [`CollectRepositoryAgent`] | nothing | test runner (initial stage) |
//! | [`RunTestsAgent`] | stage | analyst, refactorer or terminal |
//! | [`AnalystAgent`] | failing output | coder |
//! | [`CoderAgent`] | guidance | write files (post-implementation) |
//! | [`RefactorAgent`] | refactor request | write files (post-refactor) |
//! | [`WriteFilesAgent`] | file batch | test runner |
//! | [`DoneAgent`] | outcome | end of run |
//!
//! The three generating agents each get a fixed number of attempts per run
//! and hand off to the terminal agent with a failed outcome once it is used
//! up. Every hop is checked against the routing table before it is taken.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use rgm_agents::{event_channel, AgentGraph, RunServices};
//! use rgm_core::RgmConfig;
//! use rgm_llm::create_generator;
//! use rgm_runner::CommandTestRunner;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RgmConfig::default();
//!     let services = RunServices::from_config(
//!         &config,
//!         Arc::new(CommandTestRunner::new()),
//!         create_generator(&config.generation)?,
//!     );
//!
//!     let mut graph = AgentGraph::standard(&config.model, config.repository(), services)?;
//!     let (progress, _events) = event_channel();
//!     let outcome = graph.run(&progress).await?;
//!     println!("implemented: {}", outcome.implemented_file);
//!     Ok(())
//! }
//! ```

pub mod analyst;
pub mod coder;
pub mod collect;
pub mod context;
pub mod done;
pub mod error;
pub mod events;
mod generation;
pub mod graph;
pub mod log;
pub mod message;
pub mod prompts;
pub mod refactor;
pub mod run_tests;
pub mod traits;
pub mod write_files;

pub use analyst::AnalystAgent;
pub use coder::CoderAgent;
pub use collect::CollectRepositoryAgent;
pub use context::{RunContext, RunServices};
pub use done::DoneAgent;
pub use error::{AgentError, AgentResult};
pub use events::{event_channel, Progress, RunEvent};
pub use graph::{create_agent, AgentGraph};
pub use log::{RunLog, RunState, StepEntry};
pub use message::{Message, RefactorRequest, Transition};
pub use prompts::Prompts;
pub use refactor::RefactorAgent;
pub use run_tests::RunTestsAgent;
pub use traits::{give_up, Agent, AttemptBudget, IMPLEMENTATION_FAILED};
pub use write_files::WriteFilesAgent;
