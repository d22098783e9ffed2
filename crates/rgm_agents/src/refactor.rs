//! Refactor agent: cleans up passing code without changing behavior.

use async_trait::async_trait;
use tracing::{info, warn};

use rgm_core::{AgentId, Stage};

use crate::context::RunContext;
use crate::error::{AgentError, AgentResult};
use crate::events::Progress;
use crate::generation::generate_files;
use crate::message::{Message, Transition};
use crate::prompts::{files_display, refactor_prompt};
use crate::traits::{give_up, Agent, AttemptBudget};

#[derive(Debug)]
pub struct RefactorAgent {
    budget: AttemptBudget,
}

impl RefactorAgent {
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
impl Agent for RefactorAgent {
    fn id(&self) -> AgentId {
        AgentId::Refactor
    }

    async fn run(
        &mut self,
        ctx: &mut RunContext,
        input: Message,
        progress: &Progress,
    ) -> AgentResult<Transition> {
        let Message::Refactor(request) = input else {
            return Err(AgentError::unexpected(self.id(), "refactor", input.kind()));
        };

        if !self.budget.try_consume() {
            warn!(max = self.budget.max(), "Refactor out of attempts");
            return Ok(give_up());
        }
        info!(
            attempt = self.budget.used(),
            max = self.budget.max(),
            after_failure = request.after_failure,
            "Refactoring"
        );

        let prompt = refactor_prompt(ctx.snapshot(), &request);
        let files =
            generate_files(ctx, self.id(), &ctx.prompts().refactor, prompt, progress).await?;

        let display = files_display(&files);
        Ok(Transition::to(
            AgentId::WriteFiles,
            Message::Files {
                stage: Stage::PostRefactor,
                files,
            },
        )
        .with_display(display))
    }
}
