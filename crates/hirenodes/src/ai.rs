use async_trait::async_trait;
use hirecore::{ExecutorMetadata, NodeContext, NodeError, NodeExecutor, NodeKind, NodeOutput};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Overrides the client's default model when set
    pub model: Option<String>,
    pub prompt: String,
}

/// Large-language-model completion backend
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Return the model's text reply
    async fn complete(&self, request: CompletionRequest) -> Result<String, NodeError>;
}

/// `invokeAI`: adds the model's reply to the payload as `ai_suggestion`
///
/// Any client failure, including a reply without content, aborts the run.
pub struct InvokeAiExecutor {
    client: Arc<dyn CompletionClient>,
}

impl InvokeAiExecutor {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NodeExecutor for InvokeAiExecutor {
    fn node_type(&self) -> &str {
        NodeKind::INVOKE_AI
    }

    fn metadata(&self) -> ExecutorMetadata {
        ExecutorMetadata::new("Asks the configured language model for a suggestion", "ai")
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let NodeKind::InvokeAi(config) = &ctx.node.kind else {
            return Err(NodeError::Configuration(format!(
                "node {} is not an invokeAI node",
                ctx.node.id
            )));
        };

        let prompt = ctx.payload.render(&config.prompt);
        ctx.events.info("Requesting AI completion");

        let suggestion = self
            .client
            .complete(CompletionRequest {
                model: config.model.clone(),
                prompt,
            })
            .await?;

        Ok(NodeOutput::data(ctx.payload.with("ai_suggestion", suggestion)))
    }
}
