//! Built-in node executors
//!
//! One executor per recruiter node type, plus the external collaborators
//! they call: the resume counter store, the resume analyzer, the message
//! notifier and the AI completion client.

mod ai;
mod analyzer;
mod candidate;
mod communication;
mod condition;
mod config;
mod mistral;
mod postgres;
mod resume;

pub use ai::{CompletionClient, CompletionRequest, InvokeAiExecutor};
pub use analyzer::KeywordResumeAnalyzer;
pub use candidate::{InMemoryResumeCounter, NewCandidateExecutor, ResumeCounter};
pub use communication::{
    Communication, InterviewInvitationExecutor, LogNotifier, Notifier, SendCommunicationExecutor,
};
pub use condition::ConditionExecutor;
pub use config::{Services, ServicesConfig};
pub use mistral::{MistralClient, MistralConfig, DEFAULT_MISTRAL_MODEL, MISTRAL_API_URL};
pub use postgres::PgResumeCounter;
pub use resume::{AnalyzeResumeExecutor, ContactInfo, ResumeAnalysis, ResumeAnalyzer};

use hireruntime::ExecutorRegistry;
use std::sync::Arc;

/// Register all built-in executors with a registry
///
/// `invokeAI` is only registered when `services` carries a completion client.
pub fn register_all(registry: &mut ExecutorRegistry, services: &Services) {
    registry.register(Arc::new(NewCandidateExecutor::new(services.counter.clone())));
    registry.register(Arc::new(AnalyzeResumeExecutor::new(services.analyzer.clone())));
    registry.register(Arc::new(ConditionExecutor));
    registry.register(Arc::new(SendCommunicationExecutor::new(services.notifier.clone())));
    registry.register(Arc::new(InterviewInvitationExecutor::new(services.notifier.clone())));

    if let Some(client) = &services.completion {
        registry.register(Arc::new(InvokeAiExecutor::new(client.clone())));
    }
}

/// Registry with every built-in executor for `services`
pub fn default_registry(services: &Services) -> ExecutorRegistry {
    let mut registry = ExecutorRegistry::new();
    register_all(&mut registry, services);
    registry
}
