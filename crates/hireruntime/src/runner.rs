use crate::registry::ExecutorRegistry;
use chrono::Utc;
use hirecore::{
    EventBus, ExecutionEvent, FlowError, Node, NodeContext, NodeError, NodeExecutor, NodeId,
    NodeOutput, Payload, RunId, StepOutcome, Workflow, WorkflowError, WorkflowId, FALSE_HANDLE,
    TRUE_HANDLE,
};
use serde::Serialize;
use std::collections::HashSet;
use std::time::Instant;
use tokio::time::{timeout, Duration};
use tracing::{debug, error, info, warn};

/// Walks a workflow graph one node at a time
///
/// Each run owns its payload and cursor, so independent runs can proceed
/// concurrently on the same runner.
pub struct WorkflowRunner {
    config: RunnerConfig,
}

#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Hard cap on executed nodes per run
    pub max_steps: usize,
    /// Per-node timeout; `None` waits indefinitely
    pub node_timeout_ms: Option<u64>,
    /// Fail runs of workflows without a `newCandidate` node instead of
    /// returning an empty outcome
    pub require_start_node: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_steps: 1000,
            node_timeout_ms: None,
            require_start_node: true,
        }
    }
}

impl WorkflowRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Check that every node needing a real executor has one registered.
    pub fn preflight(&self, workflow: &Workflow, registry: &ExecutorRegistry) -> Result<(), FlowError> {
        for node in workflow.nodes() {
            if node.kind.requires_executor() && !registry.contains(node.node_type()) {
                return Err(FlowError::Config(format!(
                    "node '{}' is of type '{}' but no executor is registered for it",
                    node.id,
                    node.node_type()
                )));
            }
        }
        Ok(())
    }

    /// Run a workflow from its start node until no outgoing edge matches
    pub async fn run(
        &self,
        workflow: &Workflow,
        registry: &ExecutorRegistry,
        event_bus: &EventBus,
        initial_payload: Payload,
    ) -> Result<RunOutcome, FlowError> {
        self.preflight(workflow, registry)?;

        let run_id = RunId::new_v4();
        let start_time = Instant::now();

        event_bus.publish(ExecutionEvent::RunStarted {
            run_id,
            workflow_id: workflow.id.clone(),
            timestamp: Utc::now(),
        });

        info!(workflow_id = %workflow.id, %run_id, "Starting workflow run");

        let mut visited = Vec::new();
        let result = self
            .walk(workflow, registry, event_bus, run_id, initial_payload, &mut visited)
            .await;

        let duration_ms = start_time.elapsed().as_millis() as u64;

        event_bus.publish(ExecutionEvent::RunCompleted {
            run_id,
            workflow_id: workflow.id.clone(),
            success: result.is_ok(),
            steps: visited.len(),
            duration_ms,
            timestamp: Utc::now(),
        });

        match &result {
            Ok(_) => info!(
                workflow_id = %workflow.id,
                %run_id,
                steps = visited.len(),
                duration_ms,
                "Workflow run completed"
            ),
            Err(e) => error!(
                workflow_id = %workflow.id,
                %run_id,
                steps = visited.len(),
                error = %e,
                "Workflow run aborted"
            ),
        }

        result.map(|(payload, warnings)| RunOutcome {
            run_id,
            workflow_id: workflow.id.clone(),
            payload,
            visited,
            warnings,
            duration_ms,
        })
    }

    async fn walk(
        &self,
        workflow: &Workflow,
        registry: &ExecutorRegistry,
        event_bus: &EventBus,
        run_id: RunId,
        initial_payload: Payload,
        visited: &mut Vec<NodeId>,
    ) -> Result<(Payload, Vec<CapturedWarning>), FlowError> {
        let mut payload = initial_payload;
        let mut warnings = Vec::new();

        let Some(start) = workflow.start_node() else {
            if self.config.require_start_node {
                return Err(WorkflowError::NoStartNode.into());
            }
            warn!(workflow_id = %workflow.id, "No start node, nothing to run");
            return Ok((payload, warnings));
        };

        let mut seen: HashSet<&str> = HashSet::new();
        let mut current: Option<&Node> = Some(start);

        while let Some(node) = current {
            if visited.len() >= self.config.max_steps {
                return Err(WorkflowError::StepBudgetExceeded {
                    limit: self.config.max_steps,
                }
                .into());
            }
            if !seen.insert(node.id.as_str()) {
                return Err(WorkflowError::CycleDetected {
                    node_id: node.id.clone(),
                    steps: visited.len(),
                }
                .into());
            }
            visited.push(node.id.clone());

            let executor = registry.get(node.node_type());
            let ctx = NodeContext {
                run_id,
                workflow_id: workflow.id.clone(),
                node: node.clone(),
                payload: payload.clone(),
                events: event_bus.node_emitter(run_id, node.id.clone()),
            };

            event_bus.publish(ExecutionEvent::NodeStarted {
                run_id,
                node_id: node.id.clone(),
                node_type: node.node_type().to_string(),
                timestamp: Utc::now(),
            });

            let started = Instant::now();
            let output = match self.execute_node(executor.as_ref(), ctx).await {
                Ok(output) => output,
                Err(e) => {
                    error!(node_id = %node.id, node_type = node.node_type(), error = %e, "Node failed");
                    event_bus.publish(ExecutionEvent::NodeFailed {
                        run_id,
                        node_id: node.id.clone(),
                        error: e.to_string(),
                        timestamp: Utc::now(),
                    });
                    return Err(FlowError::NodeFailed {
                        node_id: node.id.clone(),
                        source: e,
                    });
                }
            };
            let duration_ms = started.elapsed().as_millis() as u64;

            for message in output.warnings {
                warn!(node_id = %node.id, %message, "Node reported a recoverable error");
                warnings.push(CapturedWarning {
                    node_id: node.id.clone(),
                    message,
                });
            }

            let (handle, branch) = match output.outcome {
                StepOutcome::Data(update) => {
                    payload = payload.merge(update);
                    (None, None)
                }
                StepOutcome::Branch(taken) => {
                    let handle = if taken { TRUE_HANDLE } else { FALSE_HANDLE };
                    (Some(handle), Some(taken))
                }
            };

            debug!(node_id = %node.id, duration_ms, ?branch, "Node completed");
            event_bus.publish(ExecutionEvent::NodeCompleted {
                run_id,
                node_id: node.id.clone(),
                branch,
                duration_ms,
                timestamp: Utc::now(),
            });

            current = match workflow.next_node_id(&node.id, handle) {
                Some(next_id) => Some(
                    workflow
                        .find_node(next_id)
                        .ok_or_else(|| WorkflowError::NodeNotFound(next_id.to_string()))?,
                ),
                None => {
                    debug!(node_id = %node.id, ?handle, "No matching outgoing edge, run complete");
                    None
                }
            };
        }

        Ok((payload, warnings))
    }

    async fn execute_node(
        &self,
        executor: &dyn NodeExecutor,
        ctx: NodeContext,
    ) -> Result<NodeOutput, NodeError> {
        match self.config.node_timeout_ms {
            Some(ms) => timeout(Duration::from_millis(ms), executor.execute(ctx))
                .await
                .unwrap_or(Err(NodeError::Timeout { ms })),
            None => executor.execute(ctx).await,
        }
    }
}

impl Default for WorkflowRunner {
    fn default() -> Self {
        Self::new(RunnerConfig::default())
    }
}

/// A recoverable error a node reported during a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapturedWarning {
    pub node_id: NodeId,
    pub message: String,
}

/// Result of a completed run
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub run_id: RunId,
    pub workflow_id: WorkflowId,
    /// Payload after the last executed node
    pub payload: Payload,
    /// Node ids in execution order
    pub visited: Vec<NodeId>,
    pub warnings: Vec<CapturedWarning>,
    pub duration_ms: u64,
}
