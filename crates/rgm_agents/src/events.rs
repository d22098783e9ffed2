//! Run events for front-ends.

use serde::Serialize;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use rgm_core::{AgentId, RunOutcome};

/// Something a front-end may want to show, in the order it happened.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunEvent {
    /// An agent is about to run.
    AgentStarted { step: u32, agent: AgentId },
    /// Display-only chunk streamed by a generating agent.
    Progress { agent: AgentId, chunk: String },
    /// An agent handed control to another.
    Routed {
        from: AgentId,
        to: AgentId,
        message: String,
        display: Option<String>,
    },
    /// The run is over.
    Finished {
        outcome: RunOutcome,
        display: Option<String>,
    },
}

/// Sending half of the event channel.
///
/// A silent handle drops every event. Events sent after the receiver is gone
/// are dropped as well.
#[derive(Debug, Clone, Default)]
pub struct Progress {
    sender: Option<UnboundedSender<RunEvent>>,
}

impl Progress {
    pub fn new(sender: UnboundedSender<RunEvent>) -> Self {
        Self {
            sender: Some(sender),
        }
    }

    /// A handle that discards events.
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn emit(&self, event: RunEvent) {
        if let Some(sender) = &self.sender {
            let _ = sender.send(event);
        }
    }

    /// Forward a streamed chunk.
    pub fn chunk(&self, agent: AgentId, chunk: &str) {
        self.emit(RunEvent::Progress {
            agent,
            chunk: chunk.to_string(),
        });
    }
}

/// Create a connected progress handle and receiver.
pub fn event_channel() -> (Progress, UnboundedReceiver<RunEvent>) {
    let (tx, rx) = unbounded_channel();
    (Progress::new(tx), rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_events_arrive_in_order() {
        let (progress, mut rx) = event_channel();
        progress.emit(RunEvent::AgentStarted {
            step: 1,
            agent: AgentId::Analyst,
        });
        progress.chunk(AgentId::Analyst, "abc");
        drop(progress);

        assert!(matches!(
            rx.recv().await,
            Some(RunEvent::AgentStarted { step: 1, .. })
        ));
        assert_eq!(
            rx.recv().await,
            Some(RunEvent::Progress {
                agent: AgentId::Analyst,
                chunk: "abc".to_string()
            })
        );
        assert_eq!(rx.recv().await, None);
    }

    #[test]
    fn test_silent_progress_drops_events() {
        Progress::silent().chunk(AgentId::Coder, "ignored");
    }
}
