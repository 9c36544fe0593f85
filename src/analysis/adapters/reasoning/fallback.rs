//! Primary/secondary provider chain.

use crate::analysis::ports::{ReasoningProvider, ReasoningRequest, ReasoningResult};
use async_trait::async_trait;
use tracing::warn;

/// Uses `secondary` only when `primary` is unavailable.
#[derive(Debug, Clone)]
pub struct FallbackProvider<P, S> {
    primary: P,
    secondary: S,
}

impl<P, S> FallbackProvider<P, S> {
    /// Chains two providers.
    #[must_use]
    pub const fn new(primary: P, secondary: S) -> Self {
        Self { primary, secondary }
    }
}

#[async_trait]
impl<P, S> ReasoningProvider for FallbackProvider<P, S>
where
    P: ReasoningProvider,
    S: ReasoningProvider,
{
    async fn complete(&self, request: &ReasoningRequest) -> ReasoningResult<String> {
        match self.primary.complete(request).await {
            Err(err) if err.is_unavailable() => {
                warn!(
                    primary = self.primary.name(),
                    secondary = self.secondary.name(),
                    error = %err,
                    "primary reasoning provider unavailable, using fallback"
                );
                self.secondary.complete(request).await
            }
            other => other,
        }
    }

    fn name(&self) -> &'static str {
        "fallback"
    }
}
