//! Issue tracker port used for escalation.

use crate::task::domain::IssueRef;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for issue tracker calls.
pub type IssueTrackerResult<T> = Result<T, IssueTrackerError>;

/// Issue to be filed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIssue {
    /// Issue title.
    pub title: String,
    /// Markdown body.
    pub body: String,
    /// Labels to apply.
    pub labels: Vec<String>,
}

/// Issue created by the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedIssue {
    /// Reference to the new issue.
    pub issue_ref: IssueRef,
    /// Web URL of the issue.
    pub url: String,
}

/// Issue creation contract.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Files `issue` and returns its reference and URL.
    ///
    /// # Errors
    ///
    /// Returns [`IssueTrackerError`] when the tracker rejects the issue or
    /// cannot be reached.
    async fn create_issue(&self, issue: &NewIssue) -> IssueTrackerResult<CreatedIssue>;
}

/// Errors returned by issue tracker implementations.
#[derive(Debug, Clone, Error)]
pub enum IssueTrackerError {
    /// The tracker answered with a non-success status.
    #[error("issue tracker returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Truncated response body.
        body: String,
    },

    /// The response could not be decoded.
    #[error("cannot decode issue tracker response: {0}")]
    Decode(String),

    /// Transport failure.
    #[error("issue tracker transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl IssueTrackerError {
    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
