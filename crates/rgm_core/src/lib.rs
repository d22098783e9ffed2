//! # rgm_core
//!
//! Core data model for the Red Green Machine.
//!
//! This crate owns everything the agents share but never implement
//! themselves: the repository description, the in-memory snapshot of its
//! source files, the write-back step that keeps snapshot and disk in sync,
//! and the routing table that says which agent may hand off to which.
//!
//! # Architecture
//!
//! - **Repository**: Immutable description of the working tree and test command
//! - **Snapshot**: Ordered, path-unique mirror of the collected source files
//! - **Write-back**: The only code path that mutates the snapshot or the disk
//! - **Routing**: Agent identities, the transition table and the test-result branch table
//! - **Config**: TOML configuration with defaults for every field
//!
//! # Example
//!
//! ```rust,no_run
//! use rgm_core::{Repository, RepositorySnapshot};
//!
//! let repo = Repository::new("/path/to/project", "uv run pytest").with_include(".py");
//! let snapshot = RepositorySnapshot::collect(&repo)?;
//! println!("collected {} files", snapshot.len());
//! # Ok::<(), rgm_core::CoreError>(())
//! ```

pub mod config;
pub mod error;
pub mod lease;
pub mod repository;
pub mod routing;
pub mod snapshot;
pub mod types;
pub mod writeback;

pub use config::{
    AgentSettings, GenerationSettings, PromptOverrides, RepositorySettings, RgmConfig,
    DEFAULT_CONFIG_FILE,
};
pub use error::{CoreError, CoreResult};
pub use lease::RepositoryLease;
pub use repository::{Repository, DEFAULT_FAILURE_MARKERS};
pub use routing::{route_test_result, AgentId, TestRoute, TransitionTable};
pub use snapshot::{RepositorySnapshot, SourceFile};
pub use types::{FileBatch, RunOutcome, Stage, Verdict};
pub use writeback::{
    classify_write_path, is_test_path, write_back, OutOfBoundsPolicy, WriteReport, WriteTarget,
};
