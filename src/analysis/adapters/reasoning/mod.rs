//! HTTP reasoning providers and the fallback combinator.

mod chat_completions;
mod fallback;
mod kigate;

pub use chat_completions::ChatCompletionsProvider;
pub use fallback::FallbackProvider;
pub use kigate::KiGateProvider;

use crate::analysis::ports::{ReasoningError, ReasoningProvider, ReasoningRequest, ReasoningResult};
use crate::config::{ReasoningBackendConfig, ReasoningBackendKind, ReasoningConfig};
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while constructing a reasoning provider.
#[derive(Debug, Error)]
pub enum ReasoningClientError {
    /// The API key is missing or not a valid header value.
    #[error("reasoning backend at {0} has no usable API key")]
    MissingApiKey(String),

    /// The HTTP client could not be built.
    #[error("cannot build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// A configured HTTP reasoning backend.
#[derive(Debug, Clone)]
pub enum HttpReasoningProvider {
    /// OpenAI-compatible chat completions.
    ChatCompletions(ChatCompletionsProvider),
    /// Agent gateway.
    KiGate(KiGateProvider),
}

impl HttpReasoningProvider {
    /// Creates the backend described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ReasoningClientError`] when the client cannot be built.
    pub fn from_config(config: &ReasoningBackendConfig) -> Result<Self, ReasoningClientError> {
        Ok(match config.kind {
            ReasoningBackendKind::ChatCompletions => {
                Self::ChatCompletions(ChatCompletionsProvider::new(config)?)
            }
            ReasoningBackendKind::Kigate => Self::KiGate(KiGateProvider::new(config)?),
        })
    }
}

#[async_trait]
impl ReasoningProvider for HttpReasoningProvider {
    async fn complete(&self, request: &ReasoningRequest) -> ReasoningResult<String> {
        match self {
            Self::ChatCompletions(provider) => provider.complete(request).await,
            Self::KiGate(provider) => provider.complete(request).await,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::ChatCompletions(provider) => provider.name(),
            Self::KiGate(provider) => provider.name(),
        }
    }
}

/// Builds the provider chain described by `config`.
///
/// # Errors
///
/// Returns [`ReasoningClientError`] when any backend cannot be built.
pub fn provider_from_config(
    config: &ReasoningConfig,
) -> Result<Arc<dyn ReasoningProvider>, ReasoningClientError> {
    let primary = HttpReasoningProvider::from_config(&config.primary)?;
    let Some(fallback) = config.fallback.as_ref() else {
        return Ok(Arc::new(primary));
    };
    Ok(Arc::new(FallbackProvider::new(
        primary,
        HttpReasoningProvider::from_config(fallback)?,
    )))
}

fn build_http_client(
    config: &ReasoningBackendConfig,
) -> Result<reqwest::Client, ReasoningClientError> {
    let key = config
        .api_key
        .as_deref()
        .ok_or_else(|| ReasoningClientError::MissingApiKey(config.base_url.clone()))?;
    let mut bearer = HeaderValue::from_str(&format!("Bearer {key}"))
        .map_err(|_| ReasoningClientError::MissingApiKey(config.base_url.clone()))?;
    bearer.set_sensitive(true);
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, bearer);

    Ok(reqwest::Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?)
}

/// Sends `request` and returns the body of a successful response.
///
/// Transport failures, 5xx and 429 answers count as unavailability; other
/// failures are rejections.
async fn send(request: reqwest::RequestBuilder) -> ReasoningResult<String> {
    let response = request
        .send()
        .await
        .map_err(|err| ReasoningError::Unavailable(err.to_string()))?;
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|err| ReasoningError::Unavailable(err.to_string()))?;
    if status.is_success() {
        return Ok(body);
    }
    let detail = format!("HTTP {status}: {}", body.chars().take(200).collect::<String>());
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        Err(ReasoningError::Unavailable(detail))
    } else {
        Err(ReasoningError::Rejected(detail))
    }
}
