//! Fetching and normalising remote tracker events.

use mockable::Clock;
use std::sync::Arc;
use tracing::{info, warn};

use crate::log_record::{
    adapters::sentry::normalize_event,
    domain::LogRecord,
    ports::{IssueQuery, RemoteIssueSource, RemoteSourceResult},
};

/// Records collected from the remote tracker.
#[derive(Debug, Default)]
pub struct RemoteFetchOutcome {
    /// Normalised records ready for persistence.
    pub records: Vec<LogRecord>,
    /// Issues listed by the tracker.
    pub issues: usize,
    /// Issues whose events could not be fetched.
    pub failed_issues: usize,
    /// Events dropped because they could not be normalised.
    pub malformed_events: usize,
}

/// Lists recent issues and their latest events.
#[derive(Clone)]
pub struct RemoteFetchService<C>
where
    C: Clock + Send + Sync,
{
    source: Arc<dyn RemoteIssueSource>,
    clock: Arc<C>,
}

impl<C> RemoteFetchService<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a new fetch service.
    #[must_use]
    pub fn new(source: Arc<dyn RemoteIssueSource>, clock: Arc<C>) -> Self {
        Self { source, clock }
    }

    /// Checks that the tracker is reachable with the configured credentials.
    pub async fn test_connection(&self) -> bool {
        self.source.test_connection().await
    }

    /// Fetches up to `events_per_issue` events for each matching issue.
    ///
    /// Failures for a single issue are logged and counted; the remaining
    /// issues are still processed.
    ///
    /// # Errors
    ///
    /// Returns the source error when the issue listing itself fails.
    pub async fn fetch(
        &self,
        query: &IssueQuery,
        events_per_issue: usize,
    ) -> RemoteSourceResult<RemoteFetchOutcome> {
        let issues = self.source.list_issues(query).await?;
        let mut outcome = RemoteFetchOutcome {
            issues: issues.len(),
            ..RemoteFetchOutcome::default()
        };

        for issue in &issues {
            let events = match self.source.list_events(&issue.id, events_per_issue).await {
                Ok(events) => events,
                Err(err) => {
                    warn!(issue_id = %issue.id, error = %err, "failed to fetch issue events");
                    outcome.failed_issues = outcome.failed_issues.saturating_add(1);
                    continue;
                }
            };
            for event in events.iter().take(events_per_issue) {
                let Some(record) = normalize_event(event, Some(&issue.id), &*self.clock) else {
                    outcome.malformed_events = outcome.malformed_events.saturating_add(1);
                    continue;
                };
                outcome.records.push(record);
            }
        }

        info!(
            issues = outcome.issues,
            records = outcome.records.len(),
            failed_issues = outcome.failed_issues,
            malformed_events = outcome.malformed_events,
            "remote fetch finished"
        );
        Ok(outcome)
    }
}
