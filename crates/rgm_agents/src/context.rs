//! State shared by every agent of one run.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use rgm_core::{
    write_back, FileBatch, OutOfBoundsPolicy, Repository, RepositorySnapshot, RgmConfig,
    WriteReport,
};
use rgm_llm::{Generator, RetryPolicy};
use rgm_runner::TestRunner;

use crate::error::AgentResult;
use crate::prompts::Prompts;

/// External collaborators and policies of a run.
#[derive(Clone)]
pub struct RunServices {
    pub runner: Arc<dyn TestRunner>,
    pub generator: Arc<dyn Generator>,
    pub retry: RetryPolicy,
    pub out_of_bounds: OutOfBoundsPolicy,
    /// Attempts allowed per generating agent
    pub max_attempts: u32,
    /// Hops before the driver gives up
    pub max_steps: u32,
    pub prompts: Prompts,
}

impl RunServices {
    pub fn new(runner: Arc<dyn TestRunner>, generator: Arc<dyn Generator>) -> Self {
        Self {
            runner,
            generator,
            retry: RetryPolicy::default(),
            out_of_bounds: OutOfBoundsPolicy::default(),
            max_attempts: 3,
            max_steps: 100,
            prompts: Prompts::default(),
        }
    }

    /// Take policies and prompts from configuration.
    pub fn from_config(
        config: &RgmConfig,
        runner: Arc<dyn TestRunner>,
        generator: Arc<dyn Generator>,
    ) -> Self {
        Self {
            runner,
            generator,
            retry: RetryPolicy::from(&config.generation),
            out_of_bounds: config.agents.out_of_bounds,
            max_attempts: config.agents.max_attempts,
            max_steps: config.agents.max_steps,
            prompts: Prompts::from_overrides(&config.prompts),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_out_of_bounds(mut self, policy: OutOfBoundsPolicy) -> Self {
        self.out_of_bounds = policy;
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn with_max_steps(mut self, steps: u32) -> Self {
        self.max_steps = steps;
        self
    }

    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }
}

impl std::fmt::Debug for RunServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunServices")
            .field("generator", &self.generator.name())
            .field("retry", &self.retry)
            .field("out_of_bounds", &self.out_of_bounds)
            .field("max_attempts", &self.max_attempts)
            .field("max_steps", &self.max_steps)
            .finish()
    }
}

/// Run context handed to every agent invocation.
///
/// Owns the repository snapshot. Agents read it freely; the only ways to
/// change it are [`RunContext::collect`] at the start of a run and
/// [`RunContext::write_files`] afterwards.
pub struct RunContext {
    run_id: Uuid,
    model: String,
    repository: Repository,
    snapshot: RepositorySnapshot,
    services: RunServices,
}

impl RunContext {
    pub fn new(model: impl Into<String>, repository: Repository, services: RunServices) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            model: model.into(),
            repository,
            snapshot: RepositorySnapshot::new(),
            services,
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    pub fn snapshot(&self) -> &RepositorySnapshot {
        &self.snapshot
    }

    pub fn services(&self) -> &RunServices {
        &self.services
    }

    pub fn runner(&self) -> &dyn TestRunner {
        self.services.runner.as_ref()
    }

    pub fn generator(&self) -> &dyn Generator {
        self.services.generator.as_ref()
    }

    pub fn retry(&self) -> &RetryPolicy {
        &self.services.retry
    }

    pub fn prompts(&self) -> &Prompts {
        &self.services.prompts
    }

    /// Load the snapshot from disk, replacing whatever it held.
    pub fn collect(&mut self) -> AgentResult<usize> {
        self.snapshot = RepositorySnapshot::collect(&self.repository)?;
        Ok(self.snapshot.len())
    }

    /// Write a generated batch to disk and snapshot.
    pub fn write_files(&mut self, files: &FileBatch) -> AgentResult<WriteReport> {
        let report = write_back(
            &self.repository.root,
            &mut self.snapshot,
            files,
            self.services.out_of_bounds,
        )?;
        info!(
            written = report.written.len(),
            skipped = report.skipped_test_paths.len(),
            "Files saved"
        );
        Ok(report)
    }
}

impl std::fmt::Debug for RunContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunContext")
            .field("run_id", &self.run_id)
            .field("model", &self.model)
            .field("root", &self.repository.root)
            .field("files", &self.snapshot.len())
            .finish()
    }
}
