//! Core agent trait and attempt budget.

use async_trait::async_trait;

use rgm_core::{AgentId, RunOutcome};

use crate::context::RunContext;
use crate::error::AgentResult;
use crate::events::Progress;
use crate::message::{Message, Transition};

/// Display text when a generating agent runs out of attempts.
pub const IMPLEMENTATION_FAILED: &str = "Implementation failed";

/// A unit of work in the graph.
///
/// An agent consumes one input message, may emit display-only progress
/// events, and returns exactly one [`Transition`]. Instances live for the
/// whole run, so state such as attempt counters carries across invocations.
#[async_trait]
pub trait Agent: Send {
    /// Identity of this agent.
    fn id(&self) -> AgentId;

    /// Run once with the given input.
    async fn run(
        &mut self,
        ctx: &mut RunContext,
        input: Message,
        progress: &Progress,
    ) -> AgentResult<Transition>;
}

/// Per-agent cap on invocations that reach the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptBudget {
    used: u32,
    max: u32,
}

impl AttemptBudget {
    pub fn new(max: u32) -> Self {
        Self { used: 0, max }
    }

    /// Consume one attempt; `false` once the cap is reached.
    pub fn try_consume(&mut self) -> bool {
        if self.used >= self.max {
            return false;
        }
        self.used += 1;
        true
    }

    pub fn used(&self) -> u32 {
        self.used
    }

    pub fn max(&self) -> u32 {
        self.max
    }
}

/// Hand-off to the terminal agent once attempts are exhausted.
pub fn give_up() -> Transition {
    Transition::to(AgentId::Done, Message::Outcome(RunOutcome::failed()))
        .with_display(IMPLEMENTATION_FAILED)
}
