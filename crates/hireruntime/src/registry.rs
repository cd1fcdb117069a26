use async_trait::async_trait;
use hirecore::{ExecutorMetadata, NodeContext, NodeError, NodeExecutor, NodeOutput};
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of available node executors
///
/// Lookups for a type with no registered executor fall back to a passthrough
/// that returns the payload unchanged.
pub struct ExecutorRegistry {
    executors: HashMap<String, Arc<dyn NodeExecutor>>,
    fallback: Arc<dyn NodeExecutor>,
}

impl ExecutorRegistry {
    pub fn new() -> Self {
        Self {
            executors: HashMap::new(),
            fallback: Arc::new(PassthroughExecutor),
        }
    }

    /// Register an executor, replacing any previous one for the same type
    pub fn register(&mut self, executor: Arc<dyn NodeExecutor>) {
        let node_type = executor.node_type().to_string();
        tracing::info!("Registering node type: {}", node_type);
        self.executors.insert(node_type, executor);
    }

    /// Executor for `node_type`, or the passthrough when none is registered
    pub fn get(&self, node_type: &str) -> Arc<dyn NodeExecutor> {
        self.executors
            .get(node_type)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone())
    }

    pub fn contains(&self, node_type: &str) -> bool {
        self.executors.contains_key(node_type)
    }

    /// All registered node types, sorted
    pub fn list_node_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.executors.keys().cloned().collect();
        types.sort();
        types
    }

    pub fn get_metadata(&self, node_type: &str) -> Option<ExecutorMetadata> {
        self.executors.get(node_type).map(|e| e.metadata())
    }
}

impl Default for ExecutorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Identity executor used for triggers and unrecognized node types
pub struct PassthroughExecutor;

#[async_trait]
impl NodeExecutor for PassthroughExecutor {
    fn node_type(&self) -> &str {
        "passthrough"
    }

    fn metadata(&self) -> ExecutorMetadata {
        ExecutorMetadata::new("Returns the payload unchanged", "general")
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        Ok(NodeOutput::data(ctx.payload))
    }
}
