//! Port for the remote error tracker.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Result type for remote issue source operations.
pub type RemoteSourceResult<T> = Result<T, RemoteSourceError>;

/// Time-windowed issue query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueQuery {
    /// Free-text tracker query, for example `is:unresolved`.
    pub query: String,
    /// Look-back window in hours.
    pub lookback_hours: u32,
    /// Maximum number of issues returned across all pages.
    pub limit: usize,
}

impl IssueQuery {
    /// Creates a query for unresolved issues.
    #[must_use]
    pub fn unresolved(lookback_hours: u32, limit: usize) -> Self {
        Self {
            query: "is:unresolved".to_owned(),
            lookback_hours,
            limit,
        }
    }
}

/// Summary of a grouped issue as reported by the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteIssue {
    /// Tracker issue identifier.
    pub id: String,
    /// Issue title.
    #[serde(default)]
    pub title: String,
    /// Code location blamed by the tracker.
    #[serde(default)]
    pub culprit: Option<String>,
    /// Link to the issue in the tracker UI.
    #[serde(default)]
    pub permalink: Option<String>,
}

/// Access to externally recorded error events.
#[async_trait]
pub trait RemoteIssueSource: Send + Sync {
    /// Performs a lightweight request to check credentials and reachability.
    ///
    /// Returns `true` only when the tracker answered with HTTP 200.
    async fn test_connection(&self) -> bool;

    /// Lists issues matching the query, following pagination up to the cap.
    async fn list_issues(&self, query: &IssueQuery) -> RemoteSourceResult<Vec<RemoteIssue>>;

    /// Lists raw events for one issue, capped at `limit`.
    async fn list_events(&self, issue_id: &str, limit: usize) -> RemoteSourceResult<Vec<Value>>;
}

/// Errors returned by remote issue sources.
#[derive(Debug, Clone, Error)]
pub enum RemoteSourceError {
    /// The tracker answered with a non-success status.
    #[error("tracker returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body excerpt.
        body: String,
    },

    /// The request did not complete.
    #[error("tracker request failed: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),

    /// The response body could not be decoded.
    #[error("tracker response could not be decoded: {0}")]
    Decode(String),
}

impl RemoteSourceError {
    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
