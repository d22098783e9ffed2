//! # rgm_runner
//!
//! Test command execution for the Red Green Machine.
//!
//! The runner invokes a repository's test command as a subprocess in the
//! repository root and captures its combined output. Whether a run passed is
//! decided by failure markers in that output, never by the exit code.
//!
//! # Features
//!
//! - **Shell Runner**: Runs the configured command through the platform shell
//! - **Timeouts**: Optional per-run limit; the child is killed on expiry
//! - **Mock Runner**: Scripted outputs and captured calls for tests
//!
//! # Example
//!
//! ```rust,no_run
//! use rgm_core::Repository;
//! use rgm_runner::{CommandTestRunner, TestRunner};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = Repository::new("/path/to/project", "uv run pytest");
//!     let run = CommandTestRunner::new().run(&repo).await?;
//!     println!("verdict: {}", run.verdict(&repo.failure_markers));
//!     Ok(())
//! }
//! ```

pub mod command;
pub mod error;
pub mod mock;
pub mod runner;

pub use command::CommandTestRunner;
pub use error::{RunnerError, RunnerResult};
pub use mock::{CapturedRun, MockRunner};
pub use runner::{TestRun, TestRunner};
