use crate::{ConditionSpec, WorkflowError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type WorkflowId = String;
pub type NodeId = String;

/// Handle carried by the edge a condition node follows when it evaluates to true.
pub const TRUE_HANDLE: &str = "true";
/// Handle carried by the edge a condition node follows when it evaluates to false.
pub const FALSE_HANDLE: &str = "false";

/// Workflow as stored by the authoring UI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub id: WorkflowId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub definition: WorkflowDefinition,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl Workflow {
    pub fn new(id: impl Into<WorkflowId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            definition: WorkflowDefinition::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = node.id.clone();
        self.definition.nodes.push(node);
        id
    }

    /// Add an unconditioned edge.
    pub fn connect(&mut self, source: &str, target: &str) {
        self.push_edge(source, target, None);
    }

    /// Add an edge taken when a condition node at `source` evaluates to `branch`.
    pub fn connect_branch(&mut self, source: &str, branch: bool, target: &str) {
        let handle = if branch { TRUE_HANDLE } else { FALSE_HANDLE };
        self.push_edge(source, target, Some(handle.to_string()));
    }

    fn push_edge(&mut self, source: &str, target: &str, source_handle: Option<String>) {
        let id = match &source_handle {
            Some(handle) => format!("e{}-{}-{}", source, handle, target),
            None => format!("e{}-{}", source, target),
        };
        self.definition.edges.push(Edge {
            id,
            source: source.to_string(),
            target: target.to_string(),
            source_handle,
        });
    }

    pub fn nodes(&self) -> &[Node] {
        &self.definition.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.definition.edges
    }

    pub fn find_node(&self, id: &str) -> Option<&Node> {
        self.definition.nodes.iter().find(|n| n.id == id)
    }

    /// First `newCandidate` node in list order.
    pub fn start_node(&self) -> Option<&Node> {
        self.definition.nodes.iter().find(|n| n.is_start())
    }

    /// Target id of the first edge leaving `source` with the given handle.
    pub fn next_node_id(&self, source: &str, handle: Option<&str>) -> Option<&str> {
        self.definition
            .edges
            .iter()
            .find(|e| e.matches(source, handle))
            .map(|e| e.target.as_str())
    }
}

/// Edge between two nodes. `source_handle` selects a condition branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    #[serde(default)]
    pub id: String,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default)]
    pub source_handle: Option<String>,
}

impl Edge {
    pub fn matches(&self, source: &str, handle: Option<&str>) -> bool {
        self.source == source && self.source_handle.as_deref() == handle
    }
}

/// Presentation-only node position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// A workflow step. `kind` is the typed view of `type` + `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawNode", into = "RawNode")]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    /// Authored configuration, kept so the workflow serializes back unchanged.
    pub data: Value,
    pub position: Option<Position>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    NewCandidate,
    NewResumeSubmissionTrigger,
    JobStatusChangeTrigger,
    DataMetricTrigger,
    ScheduledTrigger,
    ManualTrigger,
    AnalyzeResume(AnalyzeResumeConfig),
    Condition(ConditionSpec),
    SendCommunication(CommunicationConfig),
    InterviewInvitation(InvitationConfig),
    InvokeAi(InvokeAiConfig),
    /// Any type this engine does not know about; executed as a passthrough.
    Other { node_type: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResumeConfig {
    #[serde(default, alias = "jobRequirements")]
    pub job_requirements: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommunicationConfig {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub recipient: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvitationConfig {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub recipient: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvokeAiConfig {
    pub prompt: String,
    #[serde(default)]
    pub model: Option<String>,
}

impl NodeKind {
    pub const NEW_CANDIDATE: &'static str = "newCandidate";
    pub const ANALYZE_RESUME: &'static str = "analyzeResume";
    pub const CONDITION: &'static str = "condition";
    pub const SEND_COMMUNICATION: &'static str = "sendCommunication";
    pub const INTERVIEW_INVITATION: &'static str = "interviewInvitation";
    pub const INVOKE_AI: &'static str = "invokeAI";

    pub fn type_name(&self) -> &str {
        match self {
            NodeKind::NewCandidate => Self::NEW_CANDIDATE,
            NodeKind::NewResumeSubmissionTrigger => "newResumeSubmissionTrigger",
            NodeKind::JobStatusChangeTrigger => "jobStatusChangeTrigger",
            NodeKind::DataMetricTrigger => "dataMetricTrigger",
            NodeKind::ScheduledTrigger => "scheduledTrigger",
            NodeKind::ManualTrigger => "manualTrigger",
            NodeKind::AnalyzeResume(_) => Self::ANALYZE_RESUME,
            NodeKind::Condition(_) => Self::CONDITION,
            NodeKind::SendCommunication(_) => Self::SEND_COMMUNICATION,
            NodeKind::InterviewInvitation(_) => Self::INTERVIEW_INVITATION,
            NodeKind::InvokeAi(_) => Self::INVOKE_AI,
            NodeKind::Other { node_type } => node_type,
        }
    }

    pub fn is_trigger(&self) -> bool {
        matches!(
            self,
            NodeKind::NewCandidate
                | NodeKind::NewResumeSubmissionTrigger
                | NodeKind::JobStatusChangeTrigger
                | NodeKind::DataMetricTrigger
                | NodeKind::ScheduledTrigger
                | NodeKind::ManualTrigger
        )
    }

    /// Kinds whose behavior must come from a registered executor. Everything
    /// else degrades to a passthrough when no executor is registered.
    pub fn requires_executor(&self) -> bool {
        matches!(
            self,
            NodeKind::NewCandidate
                | NodeKind::AnalyzeResume(_)
                | NodeKind::Condition(_)
                | NodeKind::SendCommunication(_)
                | NodeKind::InterviewInvitation(_)
                | NodeKind::InvokeAi(_)
        )
    }

    fn parse(node_id: &str, node_type: &str, data: &Value) -> Result<Self, WorkflowError> {
        let kind = match node_type {
            Self::NEW_CANDIDATE => NodeKind::NewCandidate,
            "newResumeSubmissionTrigger" => NodeKind::NewResumeSubmissionTrigger,
            "jobStatusChangeTrigger" => NodeKind::JobStatusChangeTrigger,
            "dataMetricTrigger" => NodeKind::DataMetricTrigger,
            "scheduledTrigger" => NodeKind::ScheduledTrigger,
            "manualTrigger" => NodeKind::ManualTrigger,
            Self::ANALYZE_RESUME => NodeKind::AnalyzeResume(typed(node_id, node_type, data)?),
            Self::CONDITION => NodeKind::Condition(typed(node_id, node_type, data)?),
            Self::SEND_COMMUNICATION => {
                NodeKind::SendCommunication(typed(node_id, node_type, data)?)
            }
            Self::INTERVIEW_INVITATION => {
                NodeKind::InterviewInvitation(typed(node_id, node_type, data)?)
            }
            Self::INVOKE_AI => NodeKind::InvokeAi(typed(node_id, node_type, data)?),
            other => NodeKind::Other {
                node_type: other.to_string(),
            },
        };
        Ok(kind)
    }
}

fn typed<T: DeserializeOwned>(node_id: &str, node_type: &str, data: &Value) -> Result<T, WorkflowError> {
    let data = if data.is_null() {
        Value::Object(Default::default())
    } else {
        data.clone()
    };

    serde_json::from_value(data).map_err(|e| WorkflowError::InvalidNodeData {
        node_id: node_id.to_string(),
        node_type: node_type.to_string(),
        reason: e.to_string(),
    })
}

impl Node {
    /// Build a node from its wire type name and `data` bag.
    pub fn new(id: impl Into<NodeId>, node_type: &str, data: Value) -> Result<Self, WorkflowError> {
        let id = id.into();
        let kind = NodeKind::parse(&id, node_type, &data)?;
        Ok(Self {
            id,
            kind,
            data,
            position: None,
        })
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.position = Some(Position { x, y });
        self
    }

    pub fn node_type(&self) -> &str {
        self.kind.type_name()
    }

    pub fn is_start(&self) -> bool {
        matches!(self.kind, NodeKind::NewCandidate)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawNode {
    id: NodeId,
    #[serde(rename = "type")]
    node_type: String,
    #[serde(default)]
    data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    position: Option<Position>,
}

impl TryFrom<RawNode> for Node {
    type Error = WorkflowError;

    fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
        let kind = NodeKind::parse(&raw.id, &raw.node_type, &raw.data)?;
        Ok(Self {
            id: raw.id,
            kind,
            data: raw.data,
            position: raw.position,
        })
    }
}

impl From<Node> for RawNode {
    fn from(node: Node) -> Self {
        Self {
            node_type: node.kind.type_name().to_string(),
            id: node.id,
            data: node.data,
            position: node.position,
        }
    }
}
