use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlowError {
    #[error("Node error: {0}")]
    Node(#[from] NodeError),

    #[error("Node {node_id} failed: {source}")]
    NodeFailed {
        node_id: String,
        #[source]
        source: NodeError,
    },

    #[error("Workflow error: {0}")]
    Workflow(#[from] WorkflowError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Execution error: {0}")]
    Execution(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NodeError {
    #[error("Missing required input: {0}")]
    MissingInput(String),

    #[error("Invalid input type for '{field}': expected {expected}, got {actual}")]
    InvalidInputType {
        field: String,
        expected: String,
        actual: String,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Timeout after {ms}ms")]
    Timeout { ms: u64 },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorkflowError {
    #[error("Workflow not found: {0}")]
    NotFound(String),

    #[error("Invalid workflow: {0}")]
    Invalid(String),

    #[error("Workflow has no newCandidate start node")]
    NoStartNode,

    #[error("Cycle detected: node {node_id} reached again after {steps} steps")]
    CycleDetected { node_id: String, steps: usize },

    #[error("Step budget of {limit} exceeded")]
    StepBudgetExceeded { limit: usize },

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Invalid data for {node_type} node {node_id}: {reason}")]
    InvalidNodeData {
        node_id: String,
        node_type: String,
        reason: String,
    },
}

impl FlowError {
    /// True for errors caused by the workflow definition rather than by a node's side effect.
    pub fn is_definition_error(&self) -> bool {
        matches!(self, FlowError::Workflow(_) | FlowError::Config(_))
    }
}
