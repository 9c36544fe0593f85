//! HTTP client for a Sentry-compatible REST API.

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, LINK};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::SentryConfig;
use crate::log_record::ports::{
    IssueQuery, RemoteIssue, RemoteIssueSource, RemoteSourceError, RemoteSourceResult,
};

/// Errors raised while constructing the client.
#[derive(Debug, Error)]
pub enum SentryClientError {
    /// A required setting is missing.
    #[error("remote tracker setting '{0}' is not configured")]
    MissingSetting(&'static str),

    /// The HTTP client could not be built.
    #[error("cannot build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Client for issue and event listing.
#[derive(Debug, Clone)]
pub struct SentryClient {
    http: reqwest::Client,
    base_url: String,
    organization: String,
    project: String,
}

impl SentryClient {
    /// Creates a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SentryClientError::MissingSetting`] when organisation,
    /// project or token is absent.
    pub fn new(config: &SentryConfig) -> Result<Self, SentryClientError> {
        let organization = config
            .organization
            .clone()
            .ok_or(SentryClientError::MissingSetting("organization"))?;
        let project = config
            .project
            .clone()
            .ok_or(SentryClientError::MissingSetting("project"))?;
        let token = config
            .auth_token
            .as_deref()
            .ok_or(SentryClientError::MissingSetting("auth_token"))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let mut bearer = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| SentryClientError::MissingSetting("auth_token"))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            organization,
            project,
        })
    }

    fn project_url(&self, suffix: &str) -> String {
        format!(
            "{}/projects/{}/{}/{suffix}",
            self.base_url, self.organization, self.project
        )
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> RemoteSourceResult<(T, Option<String>)> {
        let response = request.send().await.map_err(RemoteSourceError::transport)?;
        let status = response.status();
        let next_cursor = next_cursor(response.headers());
        let body = response.text().await.map_err(RemoteSourceError::transport)?;
        if !status.is_success() {
            return Err(RemoteSourceError::Status {
                status: status.as_u16(),
                body: body.chars().take(500).collect(),
            });
        }
        let decoded =
            serde_json::from_str(&body).map_err(|err| RemoteSourceError::Decode(err.to_string()))?;
        Ok((decoded, next_cursor))
    }
}

#[async_trait]
impl RemoteIssueSource for SentryClient {
    async fn test_connection(&self) -> bool {
        let url = self.project_url("");
        match self.http.get(&url).send().await {
            Ok(response) => {
                let ok = response.status() == StatusCode::OK;
                if !ok {
                    warn!(status = %response.status(), "remote tracker connection test failed");
                }
                ok
            }
            Err(err) => {
                warn!(error = %err, "remote tracker unreachable");
                false
            }
        }
    }

    async fn list_issues(&self, query: &IssueQuery) -> RemoteSourceResult<Vec<RemoteIssue>> {
        let url = self.project_url("issues/");
        let stats_period = format!("{}h", query.lookback_hours);
        let mut issues: Vec<RemoteIssue> = Vec::new();
        let mut cursor: Option<String> = None;

        while issues.len() < query.limit {
            let remaining = query.limit.saturating_sub(issues.len()).min(100);
            let mut request = self.http.get(&url).query(&[
                ("query", query.query.as_str()),
                ("statsPeriod", stats_period.as_str()),
            ]);
            request = request.query(&[("limit", remaining)]);
            if let Some(value) = cursor.as_deref() {
                request = request.query(&[("cursor", value)]);
            }

            let (page, next): (Vec<RemoteIssue>, Option<String>) = self.get_json(request).await?;
            debug!(count = page.len(), "fetched issue page");
            let exhausted = page.is_empty();
            issues.extend(page);
            match next {
                Some(next_value) if !exhausted => cursor = Some(next_value),
                _ => break,
            }
        }

        issues.truncate(query.limit);
        Ok(issues)
    }

    async fn list_events(&self, issue_id: &str, limit: usize) -> RemoteSourceResult<Vec<Value>> {
        let url = format!("{}/issues/{issue_id}/events/", self.base_url);
        let request = self
            .http
            .get(&url)
            .query(&[("full", "true")])
            .query(&[("limit", limit)]);
        let (mut events, _): (Vec<Value>, Option<String>) = self.get_json(request).await?;
        events.truncate(limit);
        Ok(events)
    }
}

/// Extracts the cursor of the next page from a `Link` header.
///
/// The tracker always advertises a `next` link; `results="false"` marks the
/// end of the listing.
fn next_cursor(headers: &HeaderMap) -> Option<String> {
    let link = headers.get(LINK)?.to_str().ok()?;
    link.split(',').find_map(|part| {
        let attributes: Vec<&str> = part.split(';').map(str::trim).collect();
        let is_next = attributes.contains(&"rel=\"next\"");
        let has_results = attributes.contains(&"results=\"true\"");
        if !is_next || !has_results {
            return None;
        }
        attributes
            .iter()
            .find_map(|attribute| attribute.strip_prefix("cursor=\""))
            .and_then(|value| value.strip_suffix('"'))
            .map(str::to_owned)
    })
}
