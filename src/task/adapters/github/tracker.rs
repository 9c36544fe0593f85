//! Issue creation through the GitHub REST API.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::GitHubConfig;
use crate::task::domain::{IssueNumber, IssueProvider, IssueRef, RepositoryFullName, TaskDomainError};
use crate::task::ports::{CreatedIssue, IssueTracker, IssueTrackerError, IssueTrackerResult, NewIssue};

/// Errors raised while constructing the tracker.
#[derive(Debug, Error)]
pub enum GitHubTrackerError {
    /// A required setting is missing.
    #[error("issue tracker setting '{0}' is not configured")]
    MissingSetting(&'static str),

    /// The configured repository is not in `owner/repo` form.
    #[error(transparent)]
    Repository(#[from] TaskDomainError),

    /// The HTTP client could not be built.
    #[error("cannot build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Files issues in one GitHub repository.
#[derive(Debug, Clone)]
pub struct GitHubIssueTracker {
    http: reqwest::Client,
    endpoint: String,
    repository: RepositoryFullName,
}

#[derive(Debug, Deserialize)]
struct IssueResponse {
    number: u64,
    html_url: String,
}

impl GitHubIssueTracker {
    /// Creates a tracker from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubTrackerError`] when the repository or token is missing
    /// or invalid.
    pub fn new(config: &GitHubConfig) -> Result<Self, GitHubTrackerError> {
        let repository = RepositoryFullName::new(
            config
                .repository
                .clone()
                .ok_or(GitHubTrackerError::MissingSetting("repository"))?,
        )?;
        let token = config
            .token
            .as_deref()
            .ok_or(GitHubTrackerError::MissingSetting("token"))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("faultline"));
        let mut bearer = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| GitHubTrackerError::MissingSetting("token"))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            endpoint: format!(
                "{}/repos/{}/issues",
                config.api_url.trim_end_matches('/'),
                repository
            ),
            repository,
        })
    }

    /// Returns the target repository.
    #[must_use]
    pub const fn repository(&self) -> &RepositoryFullName {
        &self.repository
    }
}

#[async_trait]
impl IssueTracker for GitHubIssueTracker {
    async fn create_issue(&self, issue: &NewIssue) -> IssueTrackerResult<CreatedIssue> {
        let payload = json!({
            "title": issue.title,
            "body": issue.body,
            "labels": issue.labels,
        });
        let response = self
            .http
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(IssueTrackerError::transport)?;
        let status = response.status();
        let body = response.text().await.map_err(IssueTrackerError::transport)?;
        if !status.is_success() {
            return Err(IssueTrackerError::Status {
                status: status.as_u16(),
                body: body.chars().take(500).collect(),
            });
        }

        let created: IssueResponse =
            serde_json::from_str(&body).map_err(|err| IssueTrackerError::Decode(err.to_string()))?;
        let number = IssueNumber::new(created.number)
            .map_err(|err| IssueTrackerError::Decode(err.to_string()))?;
        info!(repository = %self.repository, number = %number, "issue created");
        Ok(CreatedIssue {
            issue_ref: IssueRef::new(IssueProvider::GitHub, self.repository.clone(), number),
            url: created.html_url,
        })
    }
}
