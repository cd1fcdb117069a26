// crates/hireruntime/tests/runner_test.rs

use async_trait::async_trait;
use hirecore::{
    EventBus, ExecutionEvent, FlowError, Node, NodeContext, NodeError, NodeExecutor, NodeKind,
    NodeOutput, Payload, Workflow, WorkflowError,
};
use hireruntime::{ExecutorRegistry, HireRuntime, RunnerConfig, RuntimeConfig, WorkflowRunner};
use serde_json::json;
use std::sync::{Arc, Mutex};

/// Records every node id it runs and tags the payload with a counter
struct RecordingExecutor {
    node_type: &'static str,
    calls: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl NodeExecutor for RecordingExecutor {
    fn node_type(&self) -> &str {
        self.node_type
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(ctx.node.id.clone());
        let update = Payload::new().with(format!("seen_{}", ctx.node.id), calls.len());
        Ok(NodeOutput::data(update))
    }
}

/// Branches on a boolean payload field
struct FlagCondition;

#[async_trait]
impl NodeExecutor for FlagCondition {
    fn node_type(&self) -> &str {
        NodeKind::CONDITION
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let flag = ctx.payload.get("flag").and_then(|v| v.as_bool()).unwrap_or(false);
        Ok(NodeOutput::branch(flag))
    }
}

struct FailingExecutor;

#[async_trait]
impl NodeExecutor for FailingExecutor {
    fn node_type(&self) -> &str {
        NodeKind::INVOKE_AI
    }

    async fn execute(&self, _ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        Err(NodeError::MalformedResponse("missing choices[0].message.content".to_string()))
    }
}

struct WarningExecutor;

#[async_trait]
impl NodeExecutor for WarningExecutor {
    fn node_type(&self) -> &str {
        NodeKind::ANALYZE_RESUME
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        Ok(NodeOutput::data(ctx.payload.with("match_score", 0))
            .with_warning("resume text missing"))
    }
}

struct SlowExecutor;

#[async_trait]
impl NodeExecutor for SlowExecutor {
    fn node_type(&self) -> &str {
        NodeKind::SEND_COMMUNICATION
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        tokio::time::sleep(std::time::Duration::from_millis(500)).await;
        Ok(NodeOutput::data(ctx.payload))
    }
}

fn node(id: &str, node_type: &str, data: serde_json::Value) -> Node {
    Node::new(id, node_type, data).unwrap()
}

fn recording_registry(calls: &Arc<Mutex<Vec<String>>>) -> ExecutorRegistry {
    let mut registry = ExecutorRegistry::new();
    for node_type in [NodeKind::NEW_CANDIDATE, NodeKind::SEND_COMMUNICATION] {
        registry.register(Arc::new(RecordingExecutor {
            node_type,
            calls: calls.clone(),
        }));
    }
    registry.register(Arc::new(FlagCondition));
    registry
}

fn linear_workflow() -> Workflow {
    let mut wf = Workflow::new("linear");
    wf.add_node(node("1", "newCandidate", json!({})));
    wf.add_node(node("2", "sendCommunication", json!({"message": "a"})));
    wf.add_node(node("3", "sendCommunication", json!({"message": "b"})));
    wf.connect("1", "2");
    wf.connect("2", "3");
    wf
}

#[tokio::test]
async fn linear_runs_are_deterministic() {
    let runner = WorkflowRunner::default();
    let bus = EventBus::new(64);
    let workflow = linear_workflow();
    let initial = Payload::new().with("resume", "text");

    let mut outcomes = Vec::new();
    for _ in 0..2 {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let registry = recording_registry(&calls);
        let outcome = runner
            .run(&workflow, &registry, &bus, initial.clone())
            .await
            .unwrap();
        assert_eq!(*calls.lock().unwrap(), vec!["1", "2", "3"]);
        outcomes.push(outcome);
    }

    assert_eq!(outcomes[0].visited, outcomes[1].visited);
    assert_eq!(outcomes[0].payload, outcomes[1].payload);
    assert_eq!(outcomes[0].payload.get_str("resume"), Some("text"));
    assert_eq!(outcomes[0].payload.get_f64("seen_3"), Some(3.0));
}

#[tokio::test]
async fn branch_result_selects_edge_and_is_not_merged() {
    let mut wf = Workflow::new("branching");
    wf.add_node(node("1", "newCandidate", json!({})));
    wf.add_node(node("2", "condition", json!({})));
    wf.add_node(node("yes", "sendCommunication", json!({"message": "yes"})));
    wf.add_node(node("no", "sendCommunication", json!({"message": "no"})));
    wf.connect("1", "2");
    wf.connect_branch("2", true, "yes");
    wf.connect_branch("2", false, "no");

    for (flag, expected) in [(true, "yes"), (false, "no")] {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let registry = recording_registry(&calls);
        let outcome = WorkflowRunner::default()
            .run(&wf, &registry, &EventBus::new(16), Payload::new().with("flag", flag))
            .await
            .unwrap();

        assert_eq!(outcome.visited, vec!["1", "2", expected]);
        assert_eq!(outcome.payload.len(), 3, "flag + seen_1 + seen_<branch>");
        assert!(!outcome.payload.contains_key("true"));
        assert!(!outcome.payload.contains_key("false"));
    }
}

#[tokio::test]
async fn missing_edge_terminates_cleanly() {
    let mut wf = Workflow::new("dead-end");
    wf.add_node(node("1", "newCandidate", json!({})));
    wf.add_node(node("2", "condition", json!({})));
    wf.add_node(node("3", "sendCommunication", json!({})));
    wf.connect("1", "2");
    wf.connect_branch("2", true, "3");

    let calls = Arc::new(Mutex::new(Vec::new()));
    let registry = recording_registry(&calls);
    let outcome = WorkflowRunner::default()
        .run(&wf, &registry, &EventBus::new(16), Payload::new().with("flag", false))
        .await
        .unwrap();

    assert_eq!(outcome.visited, vec!["1", "2"]);
    assert_eq!(*calls.lock().unwrap(), vec!["1"]);
}

#[tokio::test]
async fn executor_failure_aborts_before_next_node() {
    let mut wf = Workflow::new("failing");
    wf.add_node(node("1", "newCandidate", json!({})));
    wf.add_node(node("2", "invokeAI", json!({"prompt": "hi"})));
    wf.add_node(node("3", "sendCommunication", json!({})));
    wf.connect("1", "2");
    wf.connect("2", "3");

    let calls = Arc::new(Mutex::new(Vec::new()));
    let mut registry = recording_registry(&calls);
    registry.register(Arc::new(FailingExecutor));

    let bus = EventBus::new(64);
    let mut events = bus.subscribe();
    let err = WorkflowRunner::default()
        .run(&wf, &registry, &bus, Payload::new())
        .await
        .unwrap_err();

    match err {
        FlowError::NodeFailed { node_id, source } => {
            assert_eq!(node_id, "2");
            assert!(matches!(source, NodeError::MalformedResponse(_)));
        }
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(*calls.lock().unwrap(), vec!["1"], "node 3 must not run");

    let mut saw_failure = false;
    let mut saw_unsuccessful_completion = false;
    while let Ok(event) = events.try_recv() {
        match event {
            ExecutionEvent::NodeFailed { node_id, .. } => saw_failure = node_id == "2",
            ExecutionEvent::RunCompleted { success, steps, .. } => {
                saw_unsuccessful_completion = !success && steps == 2
            }
            _ => {}
        }
    }
    assert!(saw_failure);
    assert!(saw_unsuccessful_completion);
}

#[tokio::test]
async fn unregistered_type_is_identity() {
    let mut wf = Workflow::new("unknown");
    wf.add_node(node("1", "newCandidate", json!({})));
    wf.add_node(node("2", "slackPost", json!({"channel": "#hiring"})));
    wf.add_node(node("3", "manualTrigger", json!({})));
    wf.connect("1", "2");
    wf.connect("2", "3");

    let mut registry = ExecutorRegistry::new();
    registry.register(Arc::new(RecordingExecutor {
        node_type: NodeKind::NEW_CANDIDATE,
        calls: Arc::new(Mutex::new(Vec::new())),
    }));

    let initial = Payload::new().with("candidate", json!({"name": "Ada"}));
    let outcome = WorkflowRunner::default()
        .run(&wf, &registry, &EventBus::new(16), initial.clone())
        .await
        .unwrap();

    assert_eq!(outcome.visited, vec!["1", "2", "3"]);
    assert_eq!(outcome.payload, initial.with("seen_1", 1));
}

#[tokio::test]
async fn cycle_is_reported_instead_of_hanging() {
    let mut wf = Workflow::new("cycle");
    wf.add_node(node("1", "newCandidate", json!({})));
    wf.add_node(node("2", "sendCommunication", json!({})));
    wf.connect("1", "2");
    wf.connect("2", "1");

    let calls = Arc::new(Mutex::new(Vec::new()));
    let registry = recording_registry(&calls);
    let err = WorkflowRunner::default()
        .run(&wf, &registry, &EventBus::new(16), Payload::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        FlowError::Workflow(WorkflowError::CycleDetected { ref node_id, steps: 2 }) if node_id == "1"
    ));
    assert_eq!(calls.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn step_budget_caps_long_runs() {
    let mut wf = Workflow::new("long");
    wf.add_node(node("0", "newCandidate", json!({})));
    for i in 1..10 {
        wf.add_node(node(&i.to_string(), "sendCommunication", json!({})));
        wf.connect(&(i - 1).to_string(), &i.to_string());
    }

    let calls = Arc::new(Mutex::new(Vec::new()));
    let registry = recording_registry(&calls);
    let runner = WorkflowRunner::new(RunnerConfig {
        max_steps: 4,
        ..RunnerConfig::default()
    });

    let err = runner
        .run(&wf, &registry, &EventBus::new(16), Payload::new())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        FlowError::Workflow(WorkflowError::StepBudgetExceeded { limit: 4 })
    ));
    assert_eq!(calls.lock().unwrap().len(), 4);
}

#[tokio::test]
async fn missing_start_node() {
    let mut wf = Workflow::new("no-start");
    wf.add_node(node("1", "manualTrigger", json!({})));

    let registry = ExecutorRegistry::new();
    let err = WorkflowRunner::default()
        .run(&wf, &registry, &EventBus::new(16), Payload::new())
        .await
        .unwrap_err();
    assert!(matches!(err, FlowError::Workflow(WorkflowError::NoStartNode)));

    let lenient = WorkflowRunner::new(RunnerConfig {
        require_start_node: false,
        ..RunnerConfig::default()
    });
    let outcome = lenient
        .run(&wf, &registry, &EventBus::new(16), Payload::new().with("a", 1))
        .await
        .unwrap();
    assert!(outcome.visited.is_empty());
    assert_eq!(outcome.payload.get_f64("a"), Some(1.0));
}

#[tokio::test]
async fn dangling_edge_target_is_an_error() {
    let mut wf = Workflow::new("dangling");
    wf.add_node(node("1", "newCandidate", json!({})));
    wf.connect("1", "ghost");

    let calls = Arc::new(Mutex::new(Vec::new()));
    let registry = recording_registry(&calls);
    let err = WorkflowRunner::default()
        .run(&wf, &registry, &EventBus::new(16), Payload::new())
        .await
        .unwrap_err();
    assert!(matches!(err, FlowError::Workflow(WorkflowError::NodeNotFound(ref id)) if id == "ghost"));
}

#[tokio::test]
async fn preflight_rejects_unbacked_node_types() {
    let mut wf = Workflow::new("needs-ai");
    wf.add_node(node("1", "newCandidate", json!({})));
    wf.add_node(node("2", "invokeAI", json!({"prompt": "Summarize"})));
    wf.connect("1", "2");

    let calls = Arc::new(Mutex::new(Vec::new()));
    let registry = recording_registry(&calls);
    let err = WorkflowRunner::default()
        .run(&wf, &registry, &EventBus::new(16), Payload::new())
        .await
        .unwrap_err();

    assert!(matches!(err, FlowError::Config(ref msg) if msg.contains("invokeAI")));
    assert!(calls.lock().unwrap().is_empty(), "nothing runs when preflight fails");
}

#[tokio::test]
async fn warnings_are_captured() {
    let mut wf = Workflow::new("warn");
    wf.add_node(node("1", "newCandidate", json!({})));
    wf.add_node(node("2", "analyzeResume", json!({})));
    wf.connect("1", "2");

    let calls = Arc::new(Mutex::new(Vec::new()));
    let mut registry = recording_registry(&calls);
    registry.register(Arc::new(WarningExecutor));

    let outcome = WorkflowRunner::default()
        .run(&wf, &registry, &EventBus::new(16), Payload::new())
        .await
        .unwrap();

    assert_eq!(outcome.warnings.len(), 1);
    assert_eq!(outcome.warnings[0].node_id, "2");
    assert_eq!(outcome.payload.get_f64("match_score"), Some(0.0));
}

#[tokio::test]
async fn node_timeout_aborts_run() {
    let mut wf = Workflow::new("slow");
    wf.add_node(node("1", "newCandidate", json!({})));
    wf.add_node(node("2", "sendCommunication", json!({})));
    wf.connect("1", "2");

    let calls = Arc::new(Mutex::new(Vec::new()));
    let mut registry = recording_registry(&calls);
    registry.register(Arc::new(SlowExecutor));

    let runner = WorkflowRunner::new(RunnerConfig {
        node_timeout_ms: Some(20),
        ..RunnerConfig::default()
    });
    let err = runner
        .run(&wf, &registry, &EventBus::new(16), Payload::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        FlowError::NodeFailed { source: NodeError::Timeout { ms: 20 }, .. }
    ));
}

#[tokio::test]
async fn runtime_stores_and_runs_workflows() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let runtime = HireRuntime::with_registry(
        Arc::new(recording_registry(&calls)),
        RuntimeConfig::default(),
    );

    assert!(!runtime.register_workflow(linear_workflow()).await);
    assert!(runtime.register_workflow(linear_workflow()).await);
    assert_eq!(runtime.list_workflows().await.len(), 1);

    let outcome = runtime
        .execute_workflow("linear", Payload::new())
        .await
        .unwrap();
    assert_eq!(outcome.visited.len(), 3);

    assert!(runtime.remove_workflow("linear").await.is_some());

    let err = runtime
        .execute_workflow("linear", Payload::new())
        .await
        .unwrap_err();
    assert!(matches!(err, FlowError::Workflow(WorkflowError::NotFound(_))));
}

#[tokio::test]
async fn first_new_candidate_in_list_order_starts_the_run() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let registry = recording_registry(&calls);

    let mut wf = Workflow::new("two-starts");
    wf.add_node(node("b", "newCandidate", json!({})));
    wf.add_node(node("a", "newCandidate", json!({})));
    wf.add_node(node("2", "sendCommunication", json!({"message": "hi"})));
    wf.connect("b", "2");

    let outcome = WorkflowRunner::default()
        .run(&wf, &registry, &EventBus::new(64), Payload::new())
        .await
        .unwrap();

    assert_eq!(outcome.visited, vec!["b", "2"]);
    assert_eq!(*calls.lock().unwrap(), vec!["b", "2"]);
}

#[tokio::test]
async fn first_of_duplicate_edges_is_followed() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let registry = recording_registry(&calls);

    let mut wf = Workflow::new("duplicate-edges");
    wf.add_node(node("1", "newCandidate", json!({})));
    wf.add_node(node("2", "sendCommunication", json!({"message": "first"})));
    wf.add_node(node("3", "sendCommunication", json!({"message": "second"})));
    wf.connect("1", "3");
    wf.connect("1", "2");

    let outcome = WorkflowRunner::default()
        .run(&wf, &registry, &EventBus::new(64), Payload::new())
        .await
        .unwrap();

    assert_eq!(outcome.visited, vec!["1", "3"]);
    assert!(!outcome.payload.contains_key("seen_2"));
}
