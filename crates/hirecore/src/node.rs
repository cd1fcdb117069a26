use crate::{events::EventEmitter, Node, NodeError, Payload, RunId, WorkflowId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Core trait that every node type implements
#[async_trait]
pub trait NodeExecutor: Send + Sync {
    /// Wire type name handled by this executor (e.g. "analyzeResume")
    fn node_type(&self) -> &str;

    /// Description shown by `hire nodes` and `GET /api/nodes`
    fn metadata(&self) -> ExecutorMetadata {
        ExecutorMetadata::default()
    }

    /// Run the node against the current payload
    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError>;
}

/// Execution context passed to each node
#[derive(Clone)]
pub struct NodeContext {
    pub run_id: RunId,
    pub workflow_id: WorkflowId,

    /// The node being executed, with its typed configuration
    pub node: Node,

    /// Payload as accumulated by upstream nodes
    pub payload: Payload,

    /// Event emitter for real-time updates
    pub events: EventEmitter,
}

#[derive(Debug, Clone)]
pub struct ExecutorMetadata {
    pub description: String,
    pub category: String,
}

impl Default for ExecutorMetadata {
    fn default() -> Self {
        Self {
            description: String::new(),
            category: "general".to_string(),
        }
    }
}

impl ExecutorMetadata {
    pub fn new(description: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            category: category.into(),
        }
    }
}

/// What a step produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum StepOutcome {
    /// Fields to merge into the payload
    Data(Payload),
    /// Branch decision; selects the `"true"`/`"false"` edge and is never merged
    Branch(bool),
}

/// Output from node execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeOutput {
    pub outcome: StepOutcome,

    /// Non-fatal problems the node recovered from
    pub warnings: Vec<String>,

    pub metadata: NodeMetadata,
}

impl NodeOutput {
    pub fn data(payload: Payload) -> Self {
        Self {
            outcome: StepOutcome::Data(payload),
            warnings: Vec::new(),
            metadata: NodeMetadata::default(),
        }
    }

    pub fn branch(taken: bool) -> Self {
        Self {
            outcome: StepOutcome::Branch(taken),
            warnings: Vec::new(),
            metadata: NodeMetadata::default(),
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }
}

/// Metadata about node execution
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeMetadata {
    pub execution_time_ms: u64,
}
