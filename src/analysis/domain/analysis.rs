//! Error analysis aggregate.

use super::{AnalysisDomainError, AnalysisId, AnalysisStatus, Judgement};
use crate::log_record::domain::RecordId;
use crate::task::domain::{IssueLink, TaskId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Classifier output for one log record plus its lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorAnalysis {
    id: AnalysisId,
    record_id: RecordId,
    judgement: Judgement,
    status: AnalysisStatus,
    approved_by: Option<String>,
    approved_at: Option<DateTime<Utc>>,
    task_id: Option<TaskId>,
    issue: Option<IssueLink>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedAnalysisData {
    /// Persisted identifier.
    pub id: AnalysisId,
    /// Analysed log record.
    pub record_id: RecordId,
    /// Persisted judgement.
    pub judgement: Judgement,
    /// Persisted status.
    pub status: AnalysisStatus,
    /// Approving actor, if any.
    pub approved_by: Option<String>,
    /// Approval timestamp, if any.
    pub approved_at: Option<DateTime<Utc>>,
    /// Materialised task, if any.
    pub task_id: Option<TaskId>,
    /// Linked external issue, if any.
    pub issue: Option<IssueLink>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl ErrorAnalysis {
    /// Creates a pending analysis for a record.
    #[must_use]
    pub fn new_pending(record_id: RecordId, judgement: Judgement, clock: &impl Clock) -> Self {
        let now = clock.utc();
        Self {
            id: AnalysisId::new(),
            record_id,
            judgement,
            status: AnalysisStatus::Pending,
            approved_by: None,
            approved_at: None,
            task_id: None,
            issue: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Reconstructs an analysis from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedAnalysisData) -> Self {
        Self {
            id: data.id,
            record_id: data.record_id,
            judgement: data.judgement,
            status: data.status,
            approved_by: data.approved_by,
            approved_at: data.approved_at,
            task_id: data.task_id,
            issue: data.issue,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the analysis identifier.
    #[must_use]
    pub const fn id(&self) -> AnalysisId {
        self.id
    }

    /// Returns the analysed record identifier.
    #[must_use]
    pub const fn record_id(&self) -> RecordId {
        self.record_id
    }

    /// Returns the classifier judgement.
    #[must_use]
    pub const fn judgement(&self) -> &Judgement {
        &self.judgement
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> AnalysisStatus {
        self.status
    }

    /// Returns the approving actor, if any.
    #[must_use]
    pub fn approved_by(&self) -> Option<&str> {
        self.approved_by.as_deref()
    }

    /// Returns the approval timestamp, if any.
    #[must_use]
    pub const fn approved_at(&self) -> Option<DateTime<Utc>> {
        self.approved_at
    }

    /// Returns the materialised task, if any.
    #[must_use]
    pub const fn task_id(&self) -> Option<TaskId> {
        self.task_id
    }

    /// Returns the linked issue, if any.
    #[must_use]
    pub const fn issue(&self) -> Option<&IssueLink> {
        self.issue.as_ref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Records approval by `actor`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisDomainError::EmptyActor`] for a blank actor and
    /// [`AnalysisDomainError::InvalidTransition`] unless the analysis is
    /// pending.
    pub fn approve(&mut self, actor: &str, clock: &impl Clock) -> Result<(), AnalysisDomainError> {
        let trimmed = actor.trim();
        if trimmed.is_empty() {
            return Err(AnalysisDomainError::EmptyActor);
        }
        self.transition(AnalysisStatus::Approved)?;
        let now = clock.utc();
        self.approved_by = Some(trimmed.to_owned());
        self.approved_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Links the materialised task and moves to [`AnalysisStatus::TaskCreated`].
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisDomainError::InvalidTransition`] once a task or
    /// issue already exists.
    pub fn mark_task_created(
        &mut self,
        task_id: TaskId,
        clock: &impl Clock,
    ) -> Result<(), AnalysisDomainError> {
        self.transition(AnalysisStatus::TaskCreated)?;
        self.task_id = Some(task_id);
        self.updated_at = clock.utc();
        Ok(())
    }

    /// Records an external issue.
    ///
    /// After task creation only the linkage fields change. An open analysis
    /// moves to [`AnalysisStatus::IssueCreated`].
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisDomainError::IssueAlreadyLinked`] when an issue is
    /// already recorded.
    pub fn link_issue(
        &mut self,
        issue: IssueLink,
        clock: &impl Clock,
    ) -> Result<(), AnalysisDomainError> {
        if self.issue.is_some() {
            return Err(AnalysisDomainError::IssueAlreadyLinked(self.id));
        }
        if self.status.is_open() {
            self.transition(AnalysisStatus::IssueCreated)?;
        }
        self.issue = Some(issue);
        self.updated_at = clock.utc();
        Ok(())
    }

    fn transition(&mut self, next: AnalysisStatus) -> Result<(), AnalysisDomainError> {
        if !self.status.can_transition_to(next) {
            return Err(AnalysisDomainError::InvalidTransition {
                id: self.id,
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}
