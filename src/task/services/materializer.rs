//! Materialisation of approved or high-confidence analyses into tasks.

use super::render::{RenderError, task_description, task_tags, task_title};
use crate::analysis::{
    domain::{AnalysisDomainError, AnalysisId, AnalysisStatus, Confidence, ErrorAnalysis, Severity},
    ports::{AnalysisRepository, AnalysisRepositoryError, CandidateFilter},
};
use crate::log_record::{
    domain::RecordId,
    ports::{LogRecordRepository, LogRecordRepositoryError},
};
use crate::tag::{
    domain::Tag,
    ports::{TagRepository, TagRepositoryError},
};
use crate::task::{
    domain::{IssueLink, NewTask, Task, TaskDomainError},
    ports::{IssueTracker, NewIssue, TaskRepository, TaskRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Service-level errors for task materialisation.
#[derive(Debug, Error)]
pub enum MaterializeError {
    /// The analysis does not exist.
    #[error("analysis not found: {0}")]
    AnalysisNotFound(AnalysisId),

    /// The analysed log record does not exist.
    #[error("log record not found: {0}")]
    RecordNotFound(RecordId),

    /// The analysis already produced a task or issue.
    #[error("analysis {id} is {status} and cannot produce a task")]
    NotEligible {
        /// Analysis identifier.
        id: AnalysisId,
        /// Current status.
        status: AnalysisStatus,
    },

    /// Analysis state change was rejected.
    #[error(transparent)]
    Analysis(#[from] AnalysisDomainError),

    /// Task construction was rejected.
    #[error(transparent)]
    Task(#[from] TaskDomainError),

    /// Task text could not be rendered.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Analysis repository failure.
    #[error(transparent)]
    Analyses(#[from] AnalysisRepositoryError),

    /// Log record repository failure.
    #[error(transparent)]
    Records(#[from] LogRecordRepositoryError),

    /// Task repository failure.
    #[error(transparent)]
    Tasks(#[from] TaskRepositoryError),
}

/// Result type for materialisation operations.
pub type MaterializeResult<T> = Result<T, MaterializeError>;

/// Selection thresholds and escalation switch for a materialisation run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterializePolicy {
    /// Minimum severity, inclusive.
    pub min_severity: Severity,
    /// Minimum confidence, inclusive.
    pub min_confidence: Confidence,
    /// Maximum number of analyses per batch.
    pub limit: usize,
    /// File an external issue for high and critical analyses.
    pub escalate_issues: bool,
}

impl Default for MaterializePolicy {
    fn default() -> Self {
        Self {
            min_severity: Severity::Medium,
            min_confidence: Confidence::from_percent(70),
            limit: 50,
            escalate_issues: false,
        }
    }
}

impl MaterializePolicy {
    const fn candidate_filter(&self) -> CandidateFilter {
        CandidateFilter {
            min_severity: self.min_severity,
            min_confidence: self.min_confidence,
            limit: self.limit,
        }
    }
}

/// Counters for a materialisation batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaterializeReport {
    /// Tasks created.
    pub created: usize,
    /// External issues filed.
    pub escalated: usize,
    /// Analyses whose materialisation failed.
    pub failed: usize,
}

/// Result of materialising one analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterializeOutcome {
    /// The created task.
    pub task: Task,
    /// The analysis after linkage.
    pub analysis: ErrorAnalysis,
    /// Whether an external issue was filed.
    pub escalated: bool,
}

/// Turns error analyses into tasks and, optionally, external issues.
#[derive(Clone)]
pub struct MaterializerService<A, L, T, G, C>
where
    A: AnalysisRepository,
    L: LogRecordRepository,
    T: TaskRepository,
    G: TagRepository,
    C: Clock + Send + Sync,
{
    analyses: Arc<A>,
    records: Arc<L>,
    tasks: Arc<T>,
    tags: Arc<G>,
    issue_tracker: Option<Arc<dyn IssueTracker>>,
    clock: Arc<C>,
}

impl<A, L, T, G, C> MaterializerService<A, L, T, G, C>
where
    A: AnalysisRepository,
    L: LogRecordRepository,
    T: TaskRepository,
    G: TagRepository,
    C: Clock + Send + Sync,
{
    /// Creates a materialiser without an issue tracker.
    #[must_use]
    pub const fn new(
        analyses: Arc<A>,
        records: Arc<L>,
        tasks: Arc<T>,
        tags: Arc<G>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            analyses,
            records,
            tasks,
            tags,
            issue_tracker: None,
            clock,
        }
    }

    /// Attaches the issue tracker used for escalation.
    #[must_use]
    pub fn with_issue_tracker(mut self, issue_tracker: Arc<dyn IssueTracker>) -> Self {
        self.issue_tracker = Some(issue_tracker);
        self
    }

    /// Materialises pending analyses that pass the policy thresholds.
    ///
    /// Candidates are actionable pending analyses at or above both
    /// thresholds, newest first. Per-analysis failures are logged and
    /// counted.
    ///
    /// # Errors
    ///
    /// Returns [`MaterializeError::Analyses`] when candidates cannot be
    /// listed.
    pub async fn materialize_batch(
        &self,
        policy: &MaterializePolicy,
    ) -> MaterializeResult<MaterializeReport> {
        let candidates = self
            .analyses
            .list_candidates(&policy.candidate_filter())
            .await?;
        let mut report = MaterializeReport::default();

        for candidate in candidates {
            match self.materialize(candidate.id(), policy, None).await {
                Ok(outcome) => {
                    report.created = report.created.saturating_add(1);
                    if outcome.escalated {
                        report.escalated = report.escalated.saturating_add(1);
                    }
                }
                Err(err) => {
                    warn!(analysis_id = %candidate.id(), error = %err, "materialisation failed");
                    report.failed = report.failed.saturating_add(1);
                }
            }
        }

        info!(
            created = report.created,
            escalated = report.escalated,
            failed = report.failed,
            "materialisation batch finished"
        );
        Ok(report)
    }

    /// Materialises a single pending or approved analysis.
    ///
    /// Thresholds are not re-checked here; only the escalation switch of
    /// `policy` applies. The task is deleted again when the analysis cannot
    /// be marked, so a retry never yields a second task. Tag registry and
    /// issue tracker failures are logged and leave the created task in place.
    ///
    /// # Errors
    ///
    /// Returns [`MaterializeError`] when the analysis or its record is
    /// missing, the analysis already produced a task, rendering fails, or a
    /// repository fails.
    pub async fn materialize(
        &self,
        analysis_id: AnalysisId,
        policy: &MaterializePolicy,
        assignee: Option<&str>,
    ) -> MaterializeResult<MaterializeOutcome> {
        let mut analysis = self.load_open(analysis_id).await?;
        let record = self
            .records
            .find_by_id(analysis.record_id())
            .await?
            .ok_or_else(|| MaterializeError::RecordNotFound(analysis.record_id()))?;

        let mut input = NewTask::new(
            task_title(&analysis, &record),
            task_description(&analysis, &record)?,
        )
        .with_tags(task_tags(&analysis, &record)?);
        if let Some(name) = assignee {
            input = input.with_assignee(name);
        }

        let mut task = Task::new(input, self.clock.as_ref())?;
        analysis.mark_task_created(task.id(), self.clock.as_ref())?;
        self.tasks.store(&task).await?;
        if let Err(err) = self.analyses.update(&analysis).await {
            self.discard_task(&task).await;
            return Err(err.into());
        }
        self.register_tags(&task).await;

        let escalated = if policy.escalate_issues && analysis.judgement().severity.is_urgent() {
            self.escalate(&mut task, &mut analysis).await
        } else {
            false
        };

        info!(
            %analysis_id,
            task_id = %task.id(),
            severity = %analysis.judgement().severity,
            escalated,
            "task created"
        );
        Ok(MaterializeOutcome {
            task,
            analysis,
            escalated,
        })
    }

    /// Approves an analysis on behalf of `actor` and materialises it with
    /// `actor` as assignee.
    ///
    /// # Errors
    ///
    /// Returns [`MaterializeError`] when the analysis is missing or not
    /// pending, `actor` is blank, or materialisation fails.
    pub async fn approve(
        &self,
        analysis_id: AnalysisId,
        actor: &str,
        policy: &MaterializePolicy,
    ) -> MaterializeResult<MaterializeOutcome> {
        let mut analysis = self.load_open(analysis_id).await?;
        analysis.approve(actor, self.clock.as_ref())?;
        self.analyses.update(&analysis).await?;
        info!(%analysis_id, actor = actor.trim(), "analysis approved");
        self.materialize(analysis_id, policy, Some(actor.trim())).await
    }

    async fn load_open(&self, analysis_id: AnalysisId) -> MaterializeResult<ErrorAnalysis> {
        let analysis = self
            .analyses
            .find_by_id(analysis_id)
            .await?
            .ok_or(MaterializeError::AnalysisNotFound(analysis_id))?;
        if !analysis.status().is_open() {
            return Err(MaterializeError::NotEligible {
                id: analysis_id,
                status: analysis.status(),
            });
        }
        Ok(analysis)
    }

    async fn discard_task(&self, task: &Task) {
        match self.tasks.delete(task.id()).await {
            Ok(_) => debug!(task_id = %task.id(), "task discarded after analysis update failed"),
            Err(err) => warn!(task_id = %task.id(), error = %err, "orphaned task could not be discarded"),
        }
    }

    async fn register_tags(&self, task: &Task) {
        for name in task.tags() {
            let candidate = Tag::new(name.clone(), self.clock.as_ref());
            if let Err(err) = self.register_tag(task, &candidate).await {
                warn!(task_id = %task.id(), tag = %name, error = %err, "tag registration failed");
            }
        }
    }

    async fn register_tag(&self, task: &Task, candidate: &Tag) -> Result<(), TagRepositoryError> {
        let tag = self.tags.ensure(candidate).await?;
        self.tags.link_task(tag.id(), task.id()).await?;
        let usage_count = self.tags.refresh_usage_count(tag.id()).await?;
        debug!(task_id = %task.id(), tag = %tag.name(), usage_count, "tag linked");
        Ok(())
    }

    async fn escalate(&self, task: &mut Task, analysis: &mut ErrorAnalysis) -> bool {
        let Some(tracker) = self.issue_tracker.as_ref() else {
            debug!(task_id = %task.id(), "no issue tracker configured, skipping escalation");
            return false;
        };

        let request = NewIssue {
            title: task.title().to_owned(),
            body: task.description().to_owned(),
            labels: task.tags().iter().map(|name| name.as_str().to_owned()).collect(),
        };
        let created = match tracker.create_issue(&request).await {
            Ok(created) => created,
            Err(err) => {
                warn!(task_id = %task.id(), error = %err, "issue creation failed");
                return false;
            }
        };

        let link = IssueLink::new(created.issue_ref, created.url, self.clock.utc());
        if let Err(err) = self.link_issue(task, analysis, link).await {
            warn!(task_id = %task.id(), error = %err, "issue created but linkage failed");
            return false;
        }
        true
    }

    async fn link_issue(
        &self,
        task: &mut Task,
        analysis: &mut ErrorAnalysis,
        link: IssueLink,
    ) -> MaterializeResult<()> {
        let issue_ref = link.issue_ref().to_string();
        task.link_issue(link.clone(), self.clock.as_ref())?;
        self.tasks.update(task).await?;
        analysis.link_issue(link, self.clock.as_ref())?;
        self.analyses.update(analysis).await?;
        info!(
            task_id = %task.id(),
            issue = %issue_ref,
            "issue linked"
        );
        Ok(())
    }
}
