use crate::{registry::ExecutorRegistry, RunOutcome, RunnerConfig, WorkflowRunner};
use hirecore::{EventBus, ExecutionEvent, FlowError, Payload, Workflow, WorkflowError, WorkflowId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

/// Main runtime: registry, runner, event bus and the loaded workflows
pub struct HireRuntime {
    registry: Arc<ExecutorRegistry>,
    runner: Arc<WorkflowRunner>,
    event_bus: Arc<EventBus>,
    workflows: Arc<RwLock<HashMap<WorkflowId, Workflow>>>,
}

impl HireRuntime {
    /// Runtime with an empty registry; every node behaves as a passthrough
    pub fn new() -> Self {
        Self::with_registry(Arc::new(ExecutorRegistry::new()), RuntimeConfig::default())
    }

    pub fn with_registry(registry: Arc<ExecutorRegistry>, config: RuntimeConfig) -> Self {
        let runner = Arc::new(WorkflowRunner::new(config.runner));
        let event_bus = Arc::new(EventBus::new(config.event_buffer_size));

        Self {
            registry,
            runner,
            event_bus,
            workflows: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn registry(&self) -> &Arc<ExecutorRegistry> {
        &self.registry
    }

    /// Store a workflow, replacing any previous version with the same id.
    /// Returns true when an existing workflow was replaced.
    pub async fn register_workflow(&self, workflow: Workflow) -> bool {
        let mut workflows = self.workflows.write().await;
        workflows.insert(workflow.id.clone(), workflow).is_some()
    }

    pub async fn get_workflow(&self, id: &str) -> Option<Workflow> {
        self.workflows.read().await.get(id).cloned()
    }

    /// All stored workflows, ordered by id
    pub async fn list_workflows(&self) -> Vec<Workflow> {
        let mut workflows: Vec<Workflow> = self.workflows.read().await.values().cloned().collect();
        workflows.sort_by(|a, b| a.id.cmp(&b.id));
        workflows
    }

    pub async fn remove_workflow(&self, id: &str) -> Option<Workflow> {
        self.workflows.write().await.remove(id)
    }

    /// Run a stored workflow by id
    pub async fn execute_workflow(&self, id: &str, payload: Payload) -> Result<RunOutcome, FlowError> {
        // Clone out so the store lock is not held across the run.
        let workflow = self
            .get_workflow(id)
            .await
            .ok_or_else(|| FlowError::Workflow(WorkflowError::NotFound(id.to_string())))?;

        self.execute(&workflow, payload).await
    }

    /// Run a workflow directly, without storing it
    pub async fn execute(&self, workflow: &Workflow, payload: Payload) -> Result<RunOutcome, FlowError> {
        self.runner
            .run(workflow, &self.registry, &self.event_bus, payload)
            .await
    }

    /// Check a workflow against this runtime's registry without running it
    pub fn preflight(&self, workflow: &Workflow) -> Result<(), FlowError> {
        self.runner.preflight(workflow, &self.registry)
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ExecutionEvent> {
        self.event_bus.subscribe()
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.event_bus
    }
}

impl Default for HireRuntime {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for the runtime
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub runner: RunnerConfig,
    pub event_buffer_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            runner: RunnerConfig::default(),
            event_buffer_size: 1000,
        }
    }
}
