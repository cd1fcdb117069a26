use async_trait::async_trait;
use hirecore::{ExecutorMetadata, NodeContext, NodeError, NodeExecutor, NodeKind, NodeOutput};
use serde::Serialize;
use std::sync::Arc;

const DEFAULT_INVITATION: &str = "You are invited to interview";

/// A message leaving the system
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Communication {
    pub workflow_id: String,
    pub node_id: String,
    pub channel: Option<String>,
    pub recipient: Option<String>,
    pub message: String,
}

/// Delivery backend for outgoing messages
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, communication: Communication) -> Result<(), NodeError>;
}

/// Notifier that only writes messages to the log
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, communication: Communication) -> Result<(), NodeError> {
        tracing::info!(
            workflow_id = %communication.workflow_id,
            node_id = %communication.node_id,
            channel = communication.channel.as_deref().unwrap_or("default"),
            recipient = communication.recipient.as_deref().unwrap_or("candidate"),
            "Sending communication: {}",
            communication.message
        );
        Ok(())
    }
}

fn recipient_from(ctx: &NodeContext, configured: Option<&String>) -> Option<String> {
    configured
        .map(|r| ctx.payload.render(r))
        .or_else(|| ctx.payload.get_str("email").map(str::to_string))
}

/// `sendCommunication`: sends the node's message, payload passes through
pub struct SendCommunicationExecutor {
    notifier: Arc<dyn Notifier>,
}

impl SendCommunicationExecutor {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }
}

#[async_trait]
impl NodeExecutor for SendCommunicationExecutor {
    fn node_type(&self) -> &str {
        NodeKind::SEND_COMMUNICATION
    }

    fn metadata(&self) -> ExecutorMetadata {
        ExecutorMetadata::new("Sends a message to the candidate", "communication")
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let NodeKind::SendCommunication(config) = &ctx.node.kind else {
            return Ok(NodeOutput::data(ctx.payload));
        };

        let message = ctx.payload.render(&config.message);
        ctx.events.info(format!("Sending message: {}", message));

        self.notifier
            .send(Communication {
                workflow_id: ctx.workflow_id.clone(),
                node_id: ctx.node.id.clone(),
                channel: config.channel.clone(),
                recipient: recipient_from(&ctx, config.recipient.as_ref()),
                message,
            })
            .await?;

        Ok(NodeOutput::data(ctx.payload))
    }
}

/// `interviewInvitation`: sends an invitation and marks the candidate invited
pub struct InterviewInvitationExecutor {
    notifier: Arc<dyn Notifier>,
}

impl InterviewInvitationExecutor {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }
}

#[async_trait]
impl NodeExecutor for InterviewInvitationExecutor {
    fn node_type(&self) -> &str {
        NodeKind::INTERVIEW_INVITATION
    }

    fn metadata(&self) -> ExecutorMetadata {
        ExecutorMetadata::new("Invites the candidate to an interview", "communication")
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let NodeKind::InterviewInvitation(config) = &ctx.node.kind else {
            return Ok(NodeOutput::data(ctx.payload));
        };

        let template = config.message.as_deref().unwrap_or(DEFAULT_INVITATION);
        let message = ctx.payload.render(template);

        self.notifier
            .send(Communication {
                workflow_id: ctx.workflow_id.clone(),
                node_id: ctx.node.id.clone(),
                channel: Some("interview".to_string()),
                recipient: recipient_from(&ctx, config.recipient.as_ref()),
                message,
            })
            .await?;

        Ok(NodeOutput::data(ctx.payload.with("interview_invited", true)))
    }
}
