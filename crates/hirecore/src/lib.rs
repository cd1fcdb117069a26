//! Core abstractions for the SwipeHire workflow engine
//!
//! This crate provides the workflow graph model, the payload threaded through
//! a run, the executor trait every node type implements, and run events.

mod condition;
mod error;
pub mod events;
mod node;
mod payload;
mod validate;
mod workflow;

pub use condition::{CompareOp, ConditionSpec, DEFAULT_CONDITION_FIELD, DEFAULT_MATCH_THRESHOLD};
pub use error::{FlowError, NodeError, WorkflowError};
pub use events::*;
pub use node::{ExecutorMetadata, NodeContext, NodeExecutor, NodeMetadata, NodeOutput, StepOutcome};
pub use payload::Payload;
pub use validate::{Issue, Severity, ValidationReport};
pub use workflow::{
    AnalyzeResumeConfig, CommunicationConfig, Edge, InvitationConfig, InvokeAiConfig, Node,
    NodeId, NodeKind, Position, Workflow, WorkflowDefinition, WorkflowId, FALSE_HANDLE,
    TRUE_HANDLE,
};

/// Result type for flow operations
pub type Result<T> = std::result::Result<T, FlowError>;
