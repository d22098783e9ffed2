//! Coder agent: generates files that should make the tests pass.

use async_trait::async_trait;
use tracing::{info, warn};

use rgm_core::{AgentId, Stage};

use crate::context::RunContext;
use crate::error::{AgentError, AgentResult};
use crate::events::Progress;
use crate::generation::generate_files;
use crate::message::{Message, Transition};
use crate::prompts::{coder_prompt, files_display};
use crate::traits::{give_up, Agent, AttemptBudget};

#[derive(Debug)]
pub struct CoderAgent {
    budget: AttemptBudget,
}

impl CoderAgent {
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
impl Agent for CoderAgent {
    fn id(&self) -> AgentId {
        AgentId::Coder
    }

    async fn run(
        &mut self,
        ctx: &mut RunContext,
        input: Message,
        progress: &Progress,
    ) -> AgentResult<Transition> {
        let Message::Guidance(guidance) = input else {
            return Err(AgentError::unexpected(self.id(), "guidance", input.kind()));
        };

        if !self.budget.try_consume() {
            warn!(max = self.budget.max(), "Coder out of attempts");
            return Ok(give_up());
        }
        info!(attempt = self.budget.used(), max = self.budget.max(), "Implementing");

        let prompt = coder_prompt(ctx.snapshot(), &guidance);
        let files = generate_files(ctx, self.id(), &ctx.prompts().coder, prompt, progress).await?;

        let display = files_display(&files);
        Ok(Transition::to(
            AgentId::WriteFiles,
            Message::Files {
                stage: Stage::PostImplementation,
                files,
            },
        )
        .with_display(display))
    }
}
