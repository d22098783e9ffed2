//! Mock test runner for testing.
//!
//! Returns scripted outputs in order and records every invocation, so agent
//! tests can drive the pipeline without spawning processes.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use rgm_core::Repository;

use crate::error::{RunnerError, RunnerResult};
use crate::runner::{TestRun, TestRunner};

/// Captured invocation for verification.
#[derive(Debug, Clone)]
pub struct CapturedRun {
    pub root: PathBuf,
    pub command: String,
}

/// Scripted test runner.
///
/// Outputs are returned in order; once the script runs out the last output
/// repeats. An empty script yields empty (passing) output.
#[derive(Clone, Default)]
pub struct MockRunner {
    outputs: Arc<RwLock<Vec<String>>>,
    index: Arc<AtomicUsize>,
    captured: Arc<RwLock<Vec<CapturedRun>>>,
    simulate_failure: Arc<RwLock<Option<String>>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an output for the next run.
    pub fn add_output(self, output: impl Into<String>) -> Self {
        self.outputs.write().push(output.into());
        self
    }

    /// Queue a failing run.
    pub fn failing(self) -> Self {
        self.add_output("=================== FAILURES ===================\ntest_add failed")
    }

    /// Queue a passing run.
    pub fn passing(self) -> Self {
        self.add_output("==================== 1 passed in 0.01s ====================")
    }

    /// Make every run fail with an execution error.
    pub fn simulate_failure(self, message: impl Into<String>) -> Self {
        *self.simulate_failure.write() = Some(message.into());
        self
    }

    /// Number of runs so far.
    pub fn call_count(&self) -> usize {
        self.captured.read().len()
    }

    pub fn get_calls(&self) -> Vec<CapturedRun> {
        self.captured.read().clone()
    }

    fn next_output(&self) -> String {
        let outputs = self.outputs.read();
        if outputs.is_empty() {
            return String::new();
        }
        let index = self.index.fetch_add(1, Ordering::SeqCst);
        outputs[index.min(outputs.len() - 1)].clone()
    }
}

#[async_trait]
impl TestRunner for MockRunner {
    async fn run(&self, repo: &Repository) -> RunnerResult<TestRun> {
        self.captured.write().push(CapturedRun {
            root: repo.root.clone(),
            command: repo.test_command.clone(),
        });

        if let Some(msg) = self.simulate_failure.read().clone() {
            return Err(RunnerError::ExecutionFailed(msg));
        }

        Ok(TestRun::completed(self.next_output(), Some(0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rgm_core::Verdict;

    #[tokio::test]
    async fn test_scripted_outputs_then_last_repeats() {
        let runner = MockRunner::new().failing().passing();
        let repo = Repository::new("/work", "pytest");
        let markers = ["FAILURES", "ERRORS"];

        assert_eq!(runner.run(&repo).await.unwrap().verdict(&markers), Verdict::Fail);
        assert_eq!(runner.run(&repo).await.unwrap().verdict(&markers), Verdict::Pass);
        assert_eq!(runner.run(&repo).await.unwrap().verdict(&markers), Verdict::Pass);
        assert_eq!(runner.call_count(), 3);
        assert_eq!(runner.get_calls()[0].command, "pytest");
    }

    #[tokio::test]
    async fn test_simulated_failure() {
        let runner = MockRunner::new().simulate_failure("boom");
        let err = runner.run(&Repository::new("/work", "pytest")).await.unwrap_err();
        assert!(matches!(err, RunnerError::ExecutionFailed(_)));
        assert_eq!(runner.call_count(), 1);
    }
}
