use crate::{
    CompletionClient, InMemoryResumeCounter, KeywordResumeAnalyzer, LogNotifier, MistralClient,
    MistralConfig, Notifier, PgResumeCounter, ResumeAnalyzer, ResumeCounter,
};
use hirecore::FlowError;
use std::sync::Arc;

/// Settings for the collaborators node executors talk to
#[derive(Debug, Clone, Default)]
pub struct ServicesConfig {
    /// Postgres URL for resume counts; counts stay in memory when unset
    pub database_url: Option<String>,
    /// Mistral settings; `invokeAI` nodes are rejected when unset
    pub mistral: Option<MistralConfig>,
}

impl ServicesConfig {
    /// Read `DATABASE_URL`, `MISTRAL_API_KEY`, `MISTRAL_BASE_URL` and `MISTRAL_MODEL`
    pub fn from_env() -> Self {
        let database_url = non_empty_env("DATABASE_URL");
        let mistral = non_empty_env("MISTRAL_API_KEY").map(|key| {
            let mut config = MistralConfig::new(key);
            if let Some(base_url) = non_empty_env("MISTRAL_BASE_URL") {
                config.base_url = base_url;
            }
            if let Some(model) = non_empty_env("MISTRAL_MODEL") {
                config.model = model;
            }
            config
        });

        Self {
            database_url,
            mistral,
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Collaborators injected into the built-in executors
#[derive(Clone)]
pub struct Services {
    pub counter: Arc<dyn ResumeCounter>,
    pub analyzer: Arc<dyn ResumeAnalyzer>,
    pub notifier: Arc<dyn Notifier>,
    pub completion: Option<Arc<dyn CompletionClient>>,
}

impl Services {
    /// In-process defaults with no AI client
    pub fn in_memory() -> Self {
        Self {
            counter: Arc::new(InMemoryResumeCounter::new()),
            analyzer: Arc::new(KeywordResumeAnalyzer::new()),
            notifier: Arc::new(LogNotifier),
            completion: None,
        }
    }

    pub fn with_counter(mut self, counter: Arc<dyn ResumeCounter>) -> Self {
        self.counter = counter;
        self
    }

    pub fn with_analyzer(mut self, analyzer: Arc<dyn ResumeAnalyzer>) -> Self {
        self.analyzer = analyzer;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_completion(mut self, client: Arc<dyn CompletionClient>) -> Self {
        self.completion = Some(client);
        self
    }

    /// Build services from configuration, connecting to the database if one is set
    pub async fn from_config(config: &ServicesConfig) -> Result<Self, FlowError> {
        let mut services = Self::in_memory();

        match &config.database_url {
            Some(url) => {
                let counter = PgResumeCounter::connect(url)
                    .await
                    .map_err(|e| FlowError::Config(e.to_string()))?;
                services = services.with_counter(Arc::new(counter));
            }
            None => tracing::warn!("DATABASE_URL not set, resume counts are kept in memory"),
        }

        match &config.mistral {
            Some(mistral) => {
                let client =
                    MistralClient::new(mistral.clone()).map_err(|e| FlowError::Config(e.to_string()))?;
                tracing::info!(model = %mistral.model, "AI completion client configured");
                services = services.with_completion(Arc::new(client));
            }
            None => tracing::warn!(
                "MISTRAL_API_KEY not set, workflows with invokeAI nodes will be rejected"
            ),
        }

        Ok(services)
    }
}

impl Default for Services {
    fn default() -> Self {
        Self::in_memory()
    }
}
