//! Shell-based test runner.

use std::process::Stdio;
use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use tokio::process::Command;
use tracing::{debug, info, warn};

use rgm_core::Repository;

use crate::error::{RunnerError, RunnerResult};
use crate::runner::{TestRun, TestRunner};

/// Runs the test command through the platform shell.
#[derive(Debug, Clone, Default)]
pub struct CommandTestRunner {
    /// Extra environment variables for the child process.
    env: Vec<(String, String)>,
}

impl CommandTestRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an environment variable for every test run.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    fn shell_command(command: &str) -> Command {
        #[cfg(windows)]
        {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", command]);
            cmd
        }
        #[cfg(not(windows))]
        {
            let mut cmd = Command::new("sh");
            cmd.args(["-c", command]);
            cmd
        }
    }
}

/// Join stdout and stderr into one transcript.
fn combine(stdout: &[u8], stderr: &[u8]) -> String {
    let stdout = String::from_utf8_lossy(stdout);
    let stderr = String::from_utf8_lossy(stderr);
    if stderr.is_empty() {
        stdout.into_owned()
    } else if stdout.is_empty() {
        stderr.into_owned()
    } else {
        format!("{}\n{}", stdout, stderr)
    }
}

#[async_trait]
impl TestRunner for CommandTestRunner {
    async fn run(&self, repo: &Repository) -> RunnerResult<TestRun> {
        let command = repo.test_command.trim();
        if command.is_empty() {
            return Err(RunnerError::EmptyCommand);
        }

        info!("Running tests: {}", command);
        debug!(root = %repo.root.display(), "Test working directory");

        let mut cmd = Self::shell_command(command);
        cmd.current_dir(&repo.root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        let started_at = Utc::now();
        let start = Instant::now();

        let child = cmd.spawn().map_err(|e| RunnerError::Spawn {
            command: command.to_string(),
            source: e,
        })?;

        let output = match repo.test_timeout() {
            Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
                Ok(output) => output?,
                Err(_) => {
                    warn!("Test command exceeded {}s, killed", repo.test_timeout_secs);
                    return Err(RunnerError::Timeout(repo.test_timeout_secs));
                }
            },
            None => child.wait_with_output().await?,
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        let run = TestRun {
            output: combine(&output.stdout, &output.stderr),
            exit_code: output.status.code(),
            started_at,
            finished_at: Utc::now(),
            duration_ms,
        };

        debug!(
            exit_code = ?run.exit_code,
            duration_ms,
            bytes = run.output.len(),
            "Test command finished"
        );
        Ok(run)
    }
}
