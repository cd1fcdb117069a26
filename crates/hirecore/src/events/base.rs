use crate::{NodeId, WorkflowId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

pub type RunId = Uuid;

/// Events emitted during a workflow run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ExecutionEvent {
    RunStarted {
        run_id: RunId,
        workflow_id: WorkflowId,
        timestamp: DateTime<Utc>,
    },
    RunCompleted {
        run_id: RunId,
        workflow_id: WorkflowId,
        success: bool,
        steps: usize,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },
    NodeStarted {
        run_id: RunId,
        node_id: NodeId,
        node_type: String,
        timestamp: DateTime<Utc>,
    },
    NodeCompleted {
        run_id: RunId,
        node_id: NodeId,
        /// Set when the node was a branch decision rather than a data step.
        branch: Option<bool>,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },
    NodeFailed {
        run_id: RunId,
        node_id: NodeId,
        error: String,
        timestamp: DateTime<Utc>,
    },
    NodeEvent {
        run_id: RunId,
        node_id: NodeId,
        event: NodeEvent,
        timestamp: DateTime<Utc>,
    },
}

/// Events a node reports while it runs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type")]
pub enum NodeEvent {
    Info { message: String },
    Warning { message: String },
}

/// Handle a node uses to report progress for the current run
///
/// Messages go to bus subscribers and to the `tracing` log.
#[derive(Clone)]
pub struct EventEmitter {
    run_id: RunId,
    node_id: NodeId,
    sender: broadcast::Sender<ExecutionEvent>,
}

impl EventEmitter {
    pub fn info(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(run_id = %self.run_id, node_id = %self.node_id, "{}", message);
        self.report(NodeEvent::Info { message });
    }

    pub fn warn(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(run_id = %self.run_id, node_id = %self.node_id, "{}", message);
        self.report(NodeEvent::Warning { message });
    }

    fn report(&self, event: NodeEvent) {
        let _ = self.sender.send(ExecutionEvent::NodeEvent {
            run_id: self.run_id,
            node_id: self.node_id.clone(),
            event,
            timestamp: Utc::now(),
        });
    }
}

/// Fan-out of run events to every subscriber; with none listening, events are dropped
pub struct EventBus {
    sender: broadcast::Sender<ExecutionEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ExecutionEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: ExecutionEvent) {
        let _ = self.sender.send(event);
    }

    pub fn node_emitter(&self, run_id: RunId, node_id: NodeId) -> EventEmitter {
        EventEmitter {
            run_id,
            node_id,
            sender: self.sender.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn node_messages_carry_run_and_node() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();
        let run_id = Uuid::new_v4();

        bus.node_emitter(run_id, "2".to_string()).warn("No resume text");

        match rx.recv().await.unwrap() {
            ExecutionEvent::NodeEvent {
                run_id: got,
                node_id,
                event: NodeEvent::Warning { message },
                ..
            } => {
                assert_eq!(got, run_id);
                assert_eq!(node_id, "2");
                assert_eq!(message, "No resume text");
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn publishing_without_subscribers_is_silent() {
        let bus = EventBus::new(1);
        bus.publish(ExecutionEvent::RunStarted {
            run_id: Uuid::new_v4(),
            workflow_id: "w".to_string(),
            timestamp: Utc::now(),
        });
    }
}
