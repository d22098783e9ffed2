//! Test runner agent: the only place pass/fail is decided.

use async_trait::async_trait;
use tracing::info;

use rgm_core::{route_test_result, AgentId, TestRoute};

use crate::context::RunContext;
use crate::error::{AgentError, AgentResult};
use crate::events::Progress;
use crate::message::{Message, RefactorRequest, Transition};
use crate::prompts::test_results_display;
use crate::traits::Agent;

/// Runs the test suite and dispatches on the verdict.
#[derive(Debug, Default)]
pub struct RunTestsAgent;

#[async_trait]
impl Agent for RunTestsAgent {
    fn id(&self) -> AgentId {
        AgentId::RunTests
    }

    async fn run(
        &mut self,
        ctx: &mut RunContext,
        input: Message,
        _progress: &Progress,
    ) -> AgentResult<Transition> {
        let Message::Stage(stage) = input else {
            return Err(AgentError::unexpected(self.id(), "stage", input.kind()));
        };

        let run = ctx.runner().run(ctx.repository()).await?;
        let verdict = run.verdict(&ctx.repository().failure_markers);
        info!(%stage, %verdict, duration_ms = run.duration_ms, "Tests finished");

        let display = test_results_display(&run.output);
        let transition = match route_test_result(stage, verdict) {
            TestRoute::Analyze => Transition::to(AgentId::Analyst, Message::TestFailure(run.output)),
            TestRoute::Refactor { after_failure } => {
                let request = if after_failure {
                    RefactorRequest::after_failure(run.output)
                } else {
                    RefactorRequest::fresh()
                };
                Transition::to(AgentId::Refactor, Message::Refactor(request))
            }
            TestRoute::Finish(outcome) => Transition::to(AgentId::Done, Message::Outcome(outcome)),
        };
        Ok(transition.with_display(display))
    }
}
