//! Agent identities and the routing rules between them.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::{RunOutcome, Stage, Verdict};

/// Identity of an agent in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentId {
    CollectRepository,
    RunTests,
    Analyst,
    Coder,
    Refactor,
    WriteFiles,
    Done,
}

impl AgentId {
    /// All agent identities in pipeline order.
    pub fn all() -> &'static [AgentId] {
        &[
            AgentId::CollectRepository,
            AgentId::RunTests,
            AgentId::Analyst,
            AgentId::Coder,
            AgentId::Refactor,
            AgentId::WriteFiles,
            AgentId::Done,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentId::CollectRepository => "collect_repository",
            AgentId::RunTests => "run_tests",
            AgentId::Analyst => "analyst",
            AgentId::Coder => "coder",
            AgentId::Refactor => "refactor",
            AgentId::WriteFiles => "write_files",
            AgentId::Done => "done",
        }
    }

    /// Human-readable description for display.
    pub fn description(&self) -> &'static str {
        match self {
            AgentId::CollectRepository => "Collect repository content",
            AgentId::RunTests => "Run the test suite",
            AgentId::Analyst => "Analyze failing tests",
            AgentId::Coder => "Implement a fix",
            AgentId::Refactor => "Refactor the implementation",
            AgentId::WriteFiles => "Write generated files",
            AgentId::Done => "Finish the run",
        }
    }

    /// Whether this agent ends the run.
    pub fn is_terminal(&self) -> bool {
        *self == AgentId::Done
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Allowed hand-offs between agents.
///
/// The driver checks every hop against this table before invoking the next
/// agent.
#[derive(Debug, Clone)]
pub struct TransitionTable {
    edges: HashMap<AgentId, HashSet<AgentId>>,
}

impl TransitionTable {
    /// An empty table that allows nothing.
    pub fn empty() -> Self {
        Self {
            edges: HashMap::new(),
        }
    }

    /// The table for the standard red-green-refactor pipeline.
    pub fn standard() -> Self {
        Self::empty()
            .with_edge(AgentId::CollectRepository, AgentId::RunTests)
            .with_edge(AgentId::RunTests, AgentId::Analyst)
            .with_edge(AgentId::RunTests, AgentId::Refactor)
            .with_edge(AgentId::RunTests, AgentId::Done)
            .with_edge(AgentId::Analyst, AgentId::Coder)
            .with_edge(AgentId::Analyst, AgentId::Done)
            .with_edge(AgentId::Coder, AgentId::WriteFiles)
            .with_edge(AgentId::Coder, AgentId::Done)
            .with_edge(AgentId::Refactor, AgentId::WriteFiles)
            .with_edge(AgentId::Refactor, AgentId::Done)
            .with_edge(AgentId::WriteFiles, AgentId::RunTests)
    }

    pub fn with_edge(mut self, from: AgentId, to: AgentId) -> Self {
        self.edges.entry(from).or_default().insert(to);
        self
    }

    pub fn allows(&self, from: AgentId, to: AgentId) -> bool {
        self.edges.get(&from).is_some_and(|targets| targets.contains(&to))
    }

    /// Allowed successors of an agent, sorted.
    pub fn successors(&self, from: AgentId) -> Vec<AgentId> {
        let mut targets: Vec<AgentId> = self
            .edges
            .get(&from)
            .map(|targets| targets.iter().copied().collect())
            .unwrap_or_default();
        targets.sort();
        targets
    }

    /// Fail with [`CoreError::IllegalTransition`] when a hop is not allowed.
    pub fn check(&self, from: AgentId, to: AgentId) -> CoreResult<()> {
        if self.allows(from, to) {
            Ok(())
        } else {
            Err(CoreError::IllegalTransition { from, to })
        }
    }
}

impl Default for TransitionTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Where a classified test run goes next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestRoute {
    /// Hand the failing output to the analyst.
    Analyze,
    /// Ask the refactorer for a (new) pass.
    Refactor { after_failure: bool },
    /// End the run.
    Finish(RunOutcome),
}

impl TestRoute {
    pub fn target(&self) -> AgentId {
        match self {
            TestRoute::Analyze => AgentId::Analyst,
            TestRoute::Refactor { .. } => AgentId::Refactor,
            TestRoute::Finish(_) => AgentId::Done,
        }
    }
}

/// Branch table for a classified test run.
pub fn route_test_result(stage: Stage, verdict: Verdict) -> TestRoute {
    match (stage, verdict) {
        (Stage::Initial, Verdict::Fail) => TestRoute::Analyze,
        (Stage::Initial, Verdict::Pass) => TestRoute::Finish(RunOutcome::already_passing()),
        (Stage::PostImplementation, Verdict::Fail) => TestRoute::Analyze,
        (Stage::PostImplementation, Verdict::Pass) => TestRoute::Refactor {
            after_failure: false,
        },
        (Stage::PostRefactor, Verdict::Fail) => TestRoute::Refactor {
            after_failure: true,
        },
        (Stage::PostRefactor, Verdict::Pass) => TestRoute::Finish(RunOutcome::implemented()),
    }
}
