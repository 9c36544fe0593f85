//! Deletion of tags whose cached usage counter is zero.

use crate::tag::{
    domain::{Tag, TagName},
    ports::{TagRepository, TagRepositoryError},
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Options for a cleanup run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupRequest {
    /// Report only; never mutate.
    pub dry_run: bool,
    /// The operator confirmed deletion.
    pub confirmed: bool,
    /// Log every candidate at info level.
    pub verbose: bool,
}

/// A candidate kept because tasks still reference it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedTag {
    /// Tag name.
    pub name: TagName,
    /// Relationship count found during verification.
    pub references: u64,
}

/// Result of a cleanup run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Whether the run was a dry run.
    pub dry_run: bool,
    /// Number of tags before the run.
    pub total_before: u64,
    /// Number of tags whose cached counter was zero.
    pub candidates: usize,
    /// Tags verified unused, deleted unless dry run.
    pub removable: Vec<TagName>,
    /// Number of tags actually deleted.
    pub deleted: usize,
    /// Candidates still referenced by tasks.
    pub skipped: Vec<SkippedTag>,
    /// Candidates whose verification or deletion failed.
    pub failed: usize,
    /// Number of tags after the run.
    pub total_after: u64,
}

/// Service-level errors for tag cleanup.
#[derive(Debug, Error)]
pub enum CleanupError {
    /// A destructive run was requested without confirmation.
    #[error("deleting tags requires confirmation")]
    ConfirmationRequired,
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TagRepositoryError),
}

/// Deletes unused tags after verifying their relationships.
#[derive(Clone)]
pub struct TagCleanupService<T>
where
    T: TagRepository,
{
    tags: Arc<T>,
}

impl<T> TagCleanupService<T>
where
    T: TagRepository,
{
    /// Creates a cleanup service.
    #[must_use]
    pub const fn new(tags: Arc<T>) -> Self {
        Self { tags }
    }

    /// Runs the cleanup.
    ///
    /// Each candidate's relationships are recounted immediately before its
    /// deletion. A tag that is still referenced is skipped and its cached
    /// counter left as is.
    ///
    /// # Errors
    ///
    /// Returns [`CleanupError::ConfirmationRequired`] for an unconfirmed
    /// destructive run and [`CleanupError::Repository`] when candidates
    /// cannot be listed or counted.
    pub async fn run(&self, request: &CleanupRequest) -> Result<CleanupReport, CleanupError> {
        if !request.dry_run && !request.confirmed {
            return Err(CleanupError::ConfirmationRequired);
        }

        let total_before = self.tags.count().await?;
        let candidates = self.tags.list_unused().await?;
        let mut report = CleanupReport {
            dry_run: request.dry_run,
            total_before,
            candidates: candidates.len(),
            ..CleanupReport::default()
        };

        for tag in candidates {
            self.process(&tag, request, &mut report).await;
        }

        report.total_after = self.tags.count().await?;
        info!(
            dry_run = report.dry_run,
            candidates = report.candidates,
            deleted = report.deleted,
            skipped = report.skipped.len(),
            failed = report.failed,
            "tag cleanup finished"
        );
        Ok(report)
    }

    async fn process(&self, tag: &Tag, request: &CleanupRequest, report: &mut CleanupReport) {
        if request.verbose {
            info!(tag = %tag.name(), tag_id = %tag.id(), created_at = %tag.created_at(), "unused tag candidate");
        } else {
            debug!(tag = %tag.name(), "unused tag candidate");
        }

        let references = match self.tags.count_references(tag.id()).await {
            Ok(references) => references,
            Err(err) => {
                warn!(tag = %tag.name(), error = %err, "cannot verify tag usage");
                report.failed = report.failed.saturating_add(1);
                return;
            }
        };
        if references > 0 {
            warn!(
                tag = %tag.name(),
                references,
                "tag still referenced despite zero usage counter, skipping"
            );
            report.skipped.push(SkippedTag {
                name: tag.name().clone(),
                references,
            });
            return;
        }

        if request.dry_run {
            report.removable.push(tag.name().clone());
            return;
        }

        match self.tags.delete(tag.id()).await {
            Ok(true) => {
                report.deleted = report.deleted.saturating_add(1);
                report.removable.push(tag.name().clone());
                if request.verbose {
                    info!(tag = %tag.name(), "tag deleted");
                }
            }
            Ok(false) => debug!(tag = %tag.name(), "tag already gone"),
            Err(err) => {
                warn!(tag = %tag.name(), error = %err, "tag deletion failed");
                report.failed = report.failed.saturating_add(1);
            }
        }
    }
}
