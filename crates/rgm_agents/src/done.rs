//! Terminal agent.

use async_trait::async_trait;

use rgm_core::{AgentId, RunOutcome};

use crate::context::RunContext;
use crate::error::{AgentError, AgentResult};
use crate::events::Progress;
use crate::message::{Message, Transition};
use crate::traits::{Agent, IMPLEMENTATION_FAILED};

/// Ends the run with the outcome it received.
#[derive(Debug, Default)]
pub struct DoneAgent;

fn summary(outcome: &RunOutcome) -> &'static str {
    match (outcome.failed, outcome.implemented_file) {
        (true, _) => IMPLEMENTATION_FAILED,
        (false, true) => "Tests pass after implementation and refactoring",
        (false, false) => "Tests already pass",
    }
}

#[async_trait]
impl Agent for DoneAgent {
    fn id(&self) -> AgentId {
        AgentId::Done
    }

    async fn run(
        &mut self,
        _ctx: &mut RunContext,
        input: Message,
        _progress: &Progress,
    ) -> AgentResult<Transition> {
        let Message::Outcome(outcome) = input else {
            return Err(AgentError::unexpected(self.id(), "outcome", input.kind()));
        };
        Ok(Transition::finish(outcome).with_display(summary(&outcome)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summaries() {
        assert_eq!(summary(&RunOutcome::failed()), IMPLEMENTATION_FAILED);
        assert_eq!(summary(&RunOutcome::already_passing()), "Tests already pass");
        assert!(summary(&RunOutcome::implemented()).contains("refactoring"));
    }
}
