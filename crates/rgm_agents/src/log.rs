//! Persistent record of one run.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use rgm_core::{AgentId, RunOutcome};

use crate::error::{AgentError, AgentResult};

/// State of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Running,
    Completed,
    Failed,
}

/// One agent invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepEntry {
    pub step: u32,
    pub agent: AgentId,
    /// Kind of the input message
    pub input: String,
    /// Agent control went to, if any
    pub next: Option<AgentId>,
    pub display: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: u64,
}

/// Execution log of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunLog {
    pub run_id: Uuid,
    pub model: String,
    pub repository: PathBuf,
    pub state: RunState,
    pub steps: Vec<StepEntry>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub outcome: Option<RunOutcome>,
    pub error: Option<String>,
}

impl RunLog {
    pub fn new(run_id: Uuid, model: impl Into<String>, repository: impl Into<PathBuf>) -> Self {
        Self {
            run_id,
            model: model.into(),
            repository: repository.into(),
            state: RunState::Running,
            steps: Vec::new(),
            started_at: Utc::now(),
            completed_at: None,
            outcome: None,
            error: None,
        }
    }

    pub fn record(&mut self, entry: StepEntry) {
        self.steps.push(entry);
    }

    /// Mark the run as finished with an outcome.
    pub fn complete(&mut self, outcome: RunOutcome) {
        self.state = RunState::Completed;
        self.outcome = Some(outcome);
        self.completed_at = Some(Utc::now());
    }

    /// Mark the run as aborted by an error.
    pub fn fail(&mut self, error: &AgentError) {
        self.state = RunState::Failed;
        self.error = Some(error.to_string());
        self.completed_at = Some(Utc::now());
    }

    /// How many times an agent ran.
    pub fn invocations(&self, agent: AgentId) -> usize {
        self.steps.iter().filter(|s| s.agent == agent).count()
    }

    /// Agents in invocation order.
    pub fn path(&self) -> Vec<AgentId> {
        self.steps.iter().map(|s| s.agent).collect()
    }

    /// Save as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> AgentResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| AgentError::Serialization(e.to_string()))?;
        fs::write(path, json)?;
        debug!("Saved run log to {:?}", path);
        Ok(())
    }

    pub fn load(path: &Path) -> AgentResult<Self> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| AgentError::Serialization(e.to_string()))
    }
}
