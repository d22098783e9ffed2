//! Analyst agent: diagnoses failing tests in plain text.

use async_trait::async_trait;
use tracing::{info, warn};

use rgm_core::AgentId;

use crate::context::RunContext;
use crate::error::{AgentError, AgentResult};
use crate::events::Progress;
use crate::generation::generate_text;
use crate::message::{Message, Transition};
use crate::prompts::analyst_prompt;
use crate::traits::{give_up, Agent, AttemptBudget};

/// Turns failing test output into guidance for the coder.
#[derive(Debug)]
pub struct AnalystAgent {
    budget: AttemptBudget,
}

impl AnalystAgent {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            budget: AttemptBudget::new(max_attempts),
        }
    }

    pub fn attempts(&self) -> u32 {
        self.budget.used()
    }
}

#[async_trait]
impl Agent for AnalystAgent {
    fn id(&self) -> AgentId {
        AgentId::Analyst
    }

    async fn run(
        &mut self,
        ctx: &mut RunContext,
        input: Message,
        progress: &Progress,
    ) -> AgentResult<Transition> {
        let Message::TestFailure(output) = input else {
            return Err(AgentError::unexpected(self.id(), "test_failure", input.kind()));
        };

        if !self.budget.try_consume() {
            warn!(max = self.budget.max(), "Analyst out of attempts");
            return Ok(give_up());
        }
        info!(attempt = self.budget.used(), max = self.budget.max(), "Analyzing test failure");

        let prompt = analyst_prompt(ctx.snapshot(), &output);
        let analysis =
            generate_text(ctx, self.id(), &ctx.prompts().analyst, prompt, progress).await?;

        Ok(Transition::to(AgentId::Coder, Message::Guidance(analysis)))
    }
}
