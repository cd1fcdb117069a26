use async_trait::async_trait;
use hirecore::{ExecutorMetadata, NodeContext, NodeError, NodeExecutor, NodeKind, NodeOutput};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Per-workflow count of received candidates
#[async_trait]
pub trait ResumeCounter: Send + Sync {
    /// Increment the count for `workflow_id` and return the new value
    async fn increment(&self, workflow_id: &str) -> Result<u64, NodeError>;
}

/// Counter kept in process memory
#[derive(Default)]
pub struct InMemoryResumeCounter {
    counts: RwLock<HashMap<String, u64>>,
}

impl InMemoryResumeCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, workflow_id: &str) -> u64 {
        self.counts.read().await.get(workflow_id).copied().unwrap_or(0)
    }
}

#[async_trait]
impl ResumeCounter for InMemoryResumeCounter {
    async fn increment(&self, workflow_id: &str) -> Result<u64, NodeError> {
        let mut counts = self.counts.write().await;
        let count = counts.entry(workflow_id.to_string()).or_insert(0);
        *count += 1;
        Ok(*count)
    }
}

/// `newCandidate` trigger: counts the submission, payload passes through
pub struct NewCandidateExecutor {
    counter: Arc<dyn ResumeCounter>,
}

impl NewCandidateExecutor {
    pub fn new(counter: Arc<dyn ResumeCounter>) -> Self {
        Self { counter }
    }
}

#[async_trait]
impl NodeExecutor for NewCandidateExecutor {
    fn node_type(&self) -> &str {
        NodeKind::NEW_CANDIDATE
    }

    fn metadata(&self) -> ExecutorMetadata {
        ExecutorMetadata::new("Counts a new candidate submission for the workflow", "trigger")
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let count = self.counter.increment(&ctx.workflow_id).await?;
        tracing::debug!(workflow_id = %ctx.workflow_id, count, "Resume count incremented");

        Ok(NodeOutput::data(ctx.payload))
    }
}
