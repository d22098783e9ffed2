//! Repository collection agent.

use async_trait::async_trait;
use tracing::info;

use rgm_core::{AgentId, Stage};

use crate::context::RunContext;
use crate::error::AgentResult;
use crate::events::Progress;
use crate::message::{Message, Transition};
use crate::traits::Agent;

/// Seeds the snapshot and starts the first test run.
#[derive(Debug, Default)]
pub struct CollectRepositoryAgent;

#[async_trait]
impl Agent for CollectRepositoryAgent {
    fn id(&self) -> AgentId {
        AgentId::CollectRepository
    }

    async fn run(
        &mut self,
        ctx: &mut RunContext,
        _input: Message,
        _progress: &Progress,
    ) -> AgentResult<Transition> {
        let count = ctx.collect()?;
        info!(files = count, "Repository content collected");

        Ok(Transition::to(AgentId::RunTests, Message::Stage(Stage::Initial))
            .with_display("Repo content collected"))
    }
}
