//! Workflow execution runtime
//!
//! This crate provides the executor registry, the runner that walks a
//! workflow graph node by node, and the runtime facade that ties them to an
//! event bus and a workflow store.

mod registry;
mod runner;
mod runtime;

pub use registry::{ExecutorRegistry, PassthroughExecutor};
pub use runner::{CapturedWarning, RunOutcome, RunnerConfig, WorkflowRunner};
pub use runtime::{HireRuntime, RuntimeConfig};
