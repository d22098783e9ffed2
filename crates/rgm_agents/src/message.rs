//! Payloads threaded between agents.

use serde::{Deserialize, Serialize};

use rgm_core::{AgentId, FileBatch, RunOutcome, Stage};

/// What the refactorer is asked to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefactorRequest {
    /// Set when the previous refactoring broke the tests
    pub after_failure: bool,
    /// Failing output of that test run
    pub test_output: Option<String>,
}

impl RefactorRequest {
    /// First refactoring pass on passing code.
    pub fn fresh() -> Self {
        Self {
            after_failure: false,
            test_output: None,
        }
    }

    /// Another pass after the previous one broke the tests.
    pub fn after_failure(test_output: impl Into<String>) -> Self {
        Self {
            after_failure: true,
            test_output: Some(test_output.into()),
        }
    }
}

/// Input of one agent invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum Message {
    /// No payload.
    Empty,
    /// Which phase the next test run belongs to.
    Stage(Stage),
    /// Raw output of a failing test run.
    TestFailure(String),
    /// The analyst's diagnosis for the coder.
    Guidance(String),
    /// Instructions for the refactorer.
    Refactor(RefactorRequest),
    /// Generated files to write, tagged with the stage of the next test run.
    Files { stage: Stage, files: FileBatch },
    /// Final record for the terminal agent.
    Outcome(RunOutcome),
}

impl Message {
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Empty => "empty",
            Message::Stage(_) => "stage",
            Message::TestFailure(_) => "test_failure",
            Message::Guidance(_) => "guidance",
            Message::Refactor(_) => "refactor",
            Message::Files { .. } => "files",
            Message::Outcome(_) => "outcome",
        }
    }
}

/// Result of one agent invocation: where control goes next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// Next agent, or `None` when the run is over
    pub next: Option<AgentId>,
    /// Input for the next agent (the outcome when the run is over)
    pub message: Message,
    /// Text for the front-end
    pub display: Option<String>,
}

impl Transition {
    /// Hand off to another agent.
    pub fn to(next: AgentId, message: Message) -> Self {
        Self {
            next: Some(next),
            message,
            display: None,
        }
    }

    /// End the run.
    pub fn finish(outcome: RunOutcome) -> Self {
        Self {
            next: None,
            message: Message::Outcome(outcome),
            display: None,
        }
    }

    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }

    pub fn is_terminal(&self) -> bool {
        self.next.is_none()
    }

    /// The run's outcome, for a terminal transition.
    pub fn outcome(&self) -> Option<RunOutcome> {
        match (&self.next, &self.message) {
            (None, Message::Outcome(outcome)) => Some(*outcome),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_transition() {
        let t = Transition::finish(RunOutcome::implemented()).with_display("done");
        assert!(t.is_terminal());
        assert_eq!(t.outcome(), Some(RunOutcome::implemented()));
        assert_eq!(t.display.as_deref(), Some("done"));
    }

    #[test]
    fn test_handoff_has_no_outcome() {
        let t = Transition::to(AgentId::Done, Message::Outcome(RunOutcome::failed()));
        assert!(!t.is_terminal());
        assert_eq!(t.outcome(), None);
    }

    #[test]
    fn test_message_serialization() {
        let json = serde_json::to_value(Message::Stage(Stage::Initial)).unwrap();
        assert_eq!(json["kind"], "stage");
        assert_eq!(json["payload"], "initial");
        assert_eq!(Message::Empty.kind(), "empty");
    }
}
