//! OpenAI-compatible chat completions provider.

use super::{ReasoningClientError, build_http_client, send};
use crate::analysis::ports::{ReasoningError, ReasoningProvider, ReasoningRequest, ReasoningResult};
use crate::config::ReasoningBackendConfig;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

/// Provider calling `POST {base}/chat/completions`.
#[derive(Debug, Clone)]
pub struct ChatCompletionsProvider {
    http: reqwest::Client,
    endpoint: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

impl ChatCompletionsProvider {
    /// Creates a provider from backend settings.
    ///
    /// # Errors
    ///
    /// Returns [`ReasoningClientError`] when the API key is missing or the
    /// client cannot be built.
    pub fn new(config: &ReasoningBackendConfig) -> Result<Self, ReasoningClientError> {
        Ok(Self {
            http: build_http_client(config)?,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl ReasoningProvider for ChatCompletionsProvider {
    async fn complete(&self, request: &ReasoningRequest) -> ReasoningResult<String> {
        let payload = json!({
            "model": self.model,
            "temperature": 0.2,
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.prompt },
            ],
        });
        debug!(model = %self.model, "sending chat completion request");
        let body = send(self.http.post(&self.endpoint).json(&payload)).await?;
        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|err| ReasoningError::Rejected(format!("invalid response body: {err}")))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| ReasoningError::Rejected("response has no message content".to_owned()))
    }

    fn name(&self) -> &'static str {
        "chat-completions"
    }
}
