use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use super::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use super::{strip_code_fences, DocumentGenerator};
use crate::config::LlmConfig;
use crate::error::CompletionError;

/// Client for an OpenAI-compatible `/chat/completions` endpoint
pub struct ChatCompletionClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    max_tokens: u32,
    system_prompt: String,
}

impl ChatCompletionClient {
    /// Builds a client; a missing key is only reported when generating
    pub fn new(config: &LlmConfig, api_key: Option<String>) -> Result<Self, CompletionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CompletionError::ServiceUnavailable(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.api_base.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            system_prompt: config.system_prompt.clone(),
        })
    }

    /// Whether a credential is available
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl DocumentGenerator for ChatCompletionClient {
    async fn generate(&self, prompt: &str) -> Result<String, CompletionError> {
        let api_key = self.api_key.as_deref().ok_or(CompletionError::NotConfigured)?;

        let body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage::system(self.system_prompt.as_str()),
                ChatMessage::user(prompt),
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        debug!(model = %self.model, prompt_len = prompt.len(), "requesting completion");
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| CompletionError::ServiceUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "completion request rejected");
            return Err(CompletionError::ServiceUnavailable(format!("HTTP {}", status)));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::ServiceUnavailable(e.to_string()))?;

        let content = completion.into_content().ok_or_else(|| {
            CompletionError::ServiceUnavailable("completion has no content".to_string())
        })?;

        let document = strip_code_fences(&content);
        if document.is_empty() {
            return Err(CompletionError::ServiceUnavailable(
                "completion is empty".to_string(),
            ));
        }
        Ok(document)
    }
}
