use crate::ai::{CompletionClient, CompletionRequest};
use async_trait::async_trait;
use hirecore::NodeError;
use serde::Serialize;
use std::time::Duration;

pub const MISTRAL_API_URL: &str = "https://api.mistral.ai";
pub const DEFAULT_MISTRAL_MODEL: &str = "mistral-large-latest";

#[derive(Debug, Clone)]
pub struct MistralConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl MistralConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: MISTRAL_API_URL.to_string(),
            model: DEFAULT_MISTRAL_MODEL.to_string(),
            timeout_secs: 60,
        }
    }
}

/// Chat completion client for the Mistral API
pub struct MistralClient {
    client: reqwest::Client,
    config: MistralConfig,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

impl MistralClient {
    pub fn new(config: MistralConfig) -> Result<Self, NodeError> {
        if config.api_key.trim().is_empty() {
            return Err(NodeError::Configuration("Mistral API key is empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| NodeError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl CompletionClient for MistralClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, NodeError> {
        let model = request.model.as_deref().unwrap_or(&self.config.model);
        let body = ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
        };

        tracing::debug!(model, "Sending chat completion request");

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| NodeError::ExecutionFailed(format!("Mistral request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(NodeError::ExecutionFailed(format!(
                "Mistral API returned {}: {}",
                status, text
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| NodeError::MalformedResponse(format!("invalid JSON: {}", e)))?;

        json.pointer("/choices/0/message/content")
            .and_then(|c| c.as_str())
            .map(str::to_string)
            .ok_or_else(|| {
                NodeError::MalformedResponse("missing choices[0].message.content".to_string())
            })
    }
}
