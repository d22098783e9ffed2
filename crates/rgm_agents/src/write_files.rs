//! Write files agent: the only agent that touches disk.

use async_trait::async_trait;
use tracing::warn;

use rgm_core::{AgentId, Stage};

use crate::context::RunContext;
use crate::error::{AgentError, AgentResult};
use crate::events::Progress;
use crate::message::{Message, Transition};
use crate::traits::Agent;

#[derive(Debug, Default)]
pub struct WriteFilesAgent;

#[async_trait]
impl Agent for WriteFilesAgent {
    fn id(&self) -> AgentId {
        AgentId::WriteFiles
    }

    async fn run(
        &mut self,
        ctx: &mut RunContext,
        input: Message,
        _progress: &Progress,
    ) -> AgentResult<Transition> {
        let Message::Files { stage, files } = input else {
            return Err(AgentError::unexpected(self.id(), "files", input.kind()));
        };

        let report = ctx.write_files(&files)?;

        if report.interrupted {
            warn!(
                paths = ?report.out_of_bounds,
                "Generated path outside repository, restarting from initial test run"
            );
            return Ok(
                Transition::to(AgentId::RunTests, Message::Stage(Stage::Initial))
                    .with_display(report.summary()),
            );
        }

        let display = if report.skipped_test_paths.is_empty() && report.out_of_bounds.is_empty() {
            "Files saved".to_string()
        } else {
            format!("Files saved ({})", report.summary())
        };
        Ok(Transition::to(AgentId::RunTests, Message::Stage(stage)).with_display(display))
    }
}
