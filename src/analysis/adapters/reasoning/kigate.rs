//! Agent gateway provider.
//!
//! The gateway runs a named agent over a single message and returns the
//! agent's reply in `result`.

use super::{ReasoningClientError, build_http_client, send};
use crate::analysis::ports::{ReasoningError, ReasoningProvider, ReasoningRequest, ReasoningResult};
use crate::config::ReasoningBackendConfig;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

/// Provider calling `POST {base}/agent/execute`.
#[derive(Debug, Clone)]
pub struct KiGateProvider {
    http: reqwest::Client,
    endpoint: String,
    agent_name: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct AgentResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    result: Option<String>,
}

impl KiGateProvider {
    /// Creates a provider from backend settings.
    ///
    /// # Errors
    ///
    /// Returns [`ReasoningClientError`] when the API key is missing or the
    /// client cannot be built.
    pub fn new(config: &ReasoningBackendConfig) -> Result<Self, ReasoningClientError> {
        Ok(Self {
            http: build_http_client(config)?,
            endpoint: format!("{}/agent/execute", config.base_url.trim_end_matches('/')),
            agent_name: config.agent_name.clone(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl ReasoningProvider for KiGateProvider {
    async fn complete(&self, request: &ReasoningRequest) -> ReasoningResult<String> {
        let payload = json!({
            "agent_name": self.agent_name,
            "model": self.model,
            "message": format!("{}\n\n{}", request.system, request.prompt),
        });
        let body = send(self.http.post(&self.endpoint).json(&payload)).await?;
        let parsed: AgentResponse = serde_json::from_str(&body)
            .map_err(|err| ReasoningError::Rejected(format!("invalid response body: {err}")))?;
        if let Some(status) = parsed.status.as_deref()
            && !status.eq_ignore_ascii_case("completed")
        {
            return Err(ReasoningError::Rejected(format!("agent job ended as {status}")));
        }
        parsed
            .result
            .filter(|result| !result.trim().is_empty())
            .ok_or_else(|| ReasoningError::Rejected("agent returned no result".to_owned()))
    }

    fn name(&self) -> &'static str {
        "kigate"
    }
}
