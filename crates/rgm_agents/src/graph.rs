//! Agent graph and the driver loop.
//!
//! The graph owns one instance of every agent for the lifetime of a run,
//! together with the run context and an exclusive lease on the repository
//! root. [`AgentGraph::run`] starts at the collector, hands each transition's
//! message to the next agent, and stops at the terminal agent.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, error, info, warn};

use rgm_core::{AgentId, Repository, RepositoryLease, RunOutcome, TransitionTable};

use crate::analyst::AnalystAgent;
use crate::coder::CoderAgent;
use crate::collect::CollectRepositoryAgent;
use crate::context::{RunContext, RunServices};
use crate::done::DoneAgent;
use crate::error::{AgentError, AgentResult};
use crate::events::{Progress, RunEvent};
use crate::log::{RunLog, StepEntry};
use crate::message::Message;
use crate::refactor::RefactorAgent;
use crate::run_tests::RunTestsAgent;
use crate::traits::Agent;
use crate::write_files::WriteFilesAgent;

/// Create a fresh agent instance for an identity.
pub fn create_agent(id: AgentId, max_attempts: u32) -> Box<dyn Agent> {
    match id {
        AgentId::CollectRepository => Box::new(CollectRepositoryAgent),
        AgentId::RunTests => Box::new(RunTestsAgent),
        AgentId::Analyst => Box::new(AnalystAgent::new(max_attempts)),
        AgentId::Coder => Box::new(CoderAgent::new(max_attempts)),
        AgentId::Refactor => Box::new(RefactorAgent::new(max_attempts)),
        AgentId::WriteFiles => Box::new(WriteFilesAgent),
        AgentId::Done => Box::new(DoneAgent),
    }
}

/// One run's agents, context and routing table.
pub struct AgentGraph {
    agents: HashMap<AgentId, Box<dyn Agent>>,
    context: RunContext,
    table: TransitionTable,
    log: RunLog,
    log_path: Option<PathBuf>,
    _lease: RepositoryLease,
}

impl AgentGraph {
    /// Build a graph with the given agents.
    ///
    /// Fails with a busy error when another graph in this process already
    /// holds the repository root.
    pub fn new(
        ids: &[AgentId],
        model: impl Into<String>,
        repository: Repository,
        services: RunServices,
    ) -> AgentResult<Self> {
        let lease = RepositoryLease::acquire(&repository.root)?;
        let max_attempts = services.max_attempts;
        let agents = ids
            .iter()
            .map(|id| (*id, create_agent(*id, max_attempts)))
            .collect();

        let context = RunContext::new(model, repository, services);
        let log = RunLog::new(
            context.run_id(),
            context.model(),
            context.repository().root.clone(),
        );

        Ok(Self {
            agents,
            context,
            table: TransitionTable::standard(),
            log,
            log_path: None,
            _lease: lease,
        })
    }

    /// Build the full red-green-refactor graph.
    pub fn standard(
        model: impl Into<String>,
        repository: Repository,
        services: RunServices,
    ) -> AgentResult<Self> {
        Self::new(AgentId::all(), model, repository, services)
    }

    pub fn with_table(mut self, table: TransitionTable) -> Self {
        self.table = table;
        self
    }

    /// Persist the run log to this path after every step.
    pub fn with_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = Some(path.into());
        self
    }

    pub fn agent(&self, id: AgentId) -> Option<&dyn Agent> {
        self.agents.get(&id).map(|a| a.as_ref())
    }

    pub fn contains(&self, id: AgentId) -> bool {
        self.agents.contains_key(&id)
    }

    /// Registered identities, sorted.
    pub fn ids(&self) -> Vec<AgentId> {
        let mut ids: Vec<AgentId> = self.agents.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn context(&self) -> &RunContext {
        &self.context
    }

    pub fn log(&self) -> &RunLog {
        &self.log
    }

    pub fn log_path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }

    /// Drive the run to its terminal agent.
    ///
    /// Returns the outcome reported by the terminal agent. Errors from any
    /// agent abort the run and are recorded in the log.
    pub async fn run(&mut self, progress: &Progress) -> AgentResult<RunOutcome> {
        info!(
            run_id = %self.context.run_id(),
            root = %self.context.repository().root.display(),
            model = self.context.model(),
            "Starting run"
        );

        match self.drive(progress).await {
            Ok(outcome) => {
                self.log.complete(outcome);
                self.persist_log()?;
                info!(
                    tests_passed = outcome.tests_passed,
                    implemented_file = outcome.implemented_file,
                    failed = outcome.failed,
                    steps = self.log.steps.len(),
                    "Run finished"
                );
                Ok(outcome)
            }
            Err(e) => {
                error!(error = %e, "Run aborted");
                self.log.fail(&e);
                if let Err(persist) = self.persist_log() {
                    warn!(error = %persist, "Failed to save run log");
                }
                Err(e)
            }
        }
    }

    async fn drive(&mut self, progress: &Progress) -> AgentResult<RunOutcome> {
        let max_steps = self.context.services().max_steps;
        let mut current = AgentId::CollectRepository;
        let mut input = Message::Empty;
        let mut step: u32 = 0;

        loop {
            step += 1;
            if step > max_steps {
                return Err(AgentError::StepLimitExceeded(max_steps));
            }

            let agent = self
                .agents
                .get_mut(&current)
                .ok_or(AgentError::NotFound(current))?;

            debug!(step, agent = %current, input = input.kind(), "Invoking agent");
            progress.emit(RunEvent::AgentStarted {
                step,
                agent: current,
            });

            let input_kind = input.kind();
            let started_at = Utc::now();
            let transition = agent.run(&mut self.context, input, progress).await?;
            let finished_at = Utc::now();

            self.log.record(StepEntry {
                step,
                agent: current,
                input: input_kind.to_string(),
                next: transition.next,
                display: transition.display.clone(),
                started_at,
                finished_at,
                duration_ms: (finished_at - started_at).num_milliseconds().max(0) as u64,
            });
            self.persist_log()?;

            let Some(next) = transition.next else {
                let outcome = transition.outcome().ok_or(AgentError::MissingOutcome)?;
                progress.emit(RunEvent::Finished {
                    outcome,
                    display: transition.display,
                });
                return Ok(outcome);
            };

            self.table.check(current, next)?;
            progress.emit(RunEvent::Routed {
                from: current,
                to: next,
                message: transition.message.kind().to_string(),
                display: transition.display,
            });

            current = next;
            input = transition.message;
        }
    }

    fn persist_log(&self) -> AgentResult<()> {
        match &self.log_path {
            Some(path) => self.log.save(path),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for AgentGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentGraph")
            .field("agents", &self.ids())
            .field("context", &self.context)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_agent_matches_id() {
        for id in AgentId::all() {
            assert_eq!(create_agent(*id, 3).id(), *id);
        }
    }
}
