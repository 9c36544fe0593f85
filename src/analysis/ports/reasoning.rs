//! Reasoning provider port.
//!
//! A reasoning provider accepts a system instruction and a user prompt and
//! returns free text. Callers are responsible for interpreting the text.

use async_trait::async_trait;
use thiserror::Error;

/// Result type for reasoning provider calls.
pub type ReasoningResult<T> = Result<T, ReasoningError>;

/// Prompt pair sent to a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReasoningRequest {
    /// System instruction.
    pub system: String,
    /// User prompt.
    pub prompt: String,
}

impl ReasoningRequest {
    /// Creates a request.
    #[must_use]
    pub fn new(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
        }
    }
}

/// Text completion contract.
#[async_trait]
pub trait ReasoningProvider: Send + Sync {
    /// Returns the provider's reply to `request`.
    ///
    /// # Errors
    ///
    /// Returns [`ReasoningError::Unavailable`] when the provider cannot be
    /// reached and [`ReasoningError::Rejected`] when it answers with an
    /// error or an unusable payload.
    async fn complete(&self, request: &ReasoningRequest) -> ReasoningResult<String>;

    /// Short provider name used in logs.
    fn name(&self) -> &'static str;
}

/// Errors returned by reasoning providers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReasoningError {
    /// The provider could not be reached.
    #[error("reasoning provider unavailable: {0}")]
    Unavailable(String),

    /// The provider answered but the reply cannot be used.
    #[error("reasoning provider rejected the request: {0}")]
    Rejected(String),
}

impl ReasoningError {
    /// Returns `true` when another provider may succeed.
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}
