//! Test runner trait and types.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rgm_core::{Repository, Verdict};

use crate::error::RunnerResult;

/// Result of one test command invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestRun {
    /// Combined stdout and stderr
    pub output: String,
    /// Exit code, if the process exited normally
    pub exit_code: Option<i32>,
    /// Execution start time
    pub started_at: DateTime<Utc>,
    /// Execution end time
    pub finished_at: DateTime<Utc>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl TestRun {
    /// Build a run result that started and finished now.
    pub fn completed(output: impl Into<String>, exit_code: Option<i32>) -> Self {
        let now = Utc::now();
        Self {
            output: output.into(),
            exit_code,
            started_at: now,
            finished_at: now,
            duration_ms: 0,
        }
    }

    /// Classify the output against failure markers.
    pub fn verdict<S: AsRef<str>>(&self, markers: &[S]) -> Verdict {
        Verdict::classify(&self.output, markers)
    }
}

/// Runs a repository's test suite.
#[async_trait]
pub trait TestRunner: Send + Sync {
    /// Run the repository's test command once from its root.
    async fn run(&self, repo: &Repository) -> RunnerResult<TestRun>;
}
