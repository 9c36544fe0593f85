//! Severity classification of unanalyzed log records.

use super::prompt::{JudgementError, SYSTEM_PROMPT, build_prompt, parse_judgement};
use crate::analysis::{
    domain::ErrorAnalysis,
    ports::{
        AnalysisRepository, AnalysisRepositoryError, ReasoningError, ReasoningProvider,
        ReasoningRequest,
    },
};
use crate::log_record::{
    domain::{LogLevel, RecordId},
    ports::{LogRecordRepository, LogRecordRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Service-level errors for classification.
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// The log record does not exist.
    #[error("log record not found: {0}")]
    RecordNotFound(RecordId),
    /// Log record repository failure.
    #[error(transparent)]
    Records(#[from] LogRecordRepositoryError),
    /// Analysis repository failure.
    #[error(transparent)]
    Analyses(#[from] AnalysisRepositoryError),
    /// The reasoning provider failed.
    #[error(transparent)]
    Reasoning(#[from] ReasoningError),
    /// The provider reply could not be interpreted.
    #[error(transparent)]
    Judgement(#[from] JudgementError),
}

/// Result type for classifier operations.
pub type ClassifierResult<T> = Result<T, ClassifierError>;

/// Outcome of classifying one record.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifyOutcome {
    /// A new analysis was stored.
    Created(ErrorAnalysis),
    /// The record had already been analysed.
    Existing(ErrorAnalysis),
}

impl ClassifyOutcome {
    /// Returns the analysis regardless of outcome.
    #[must_use]
    pub const fn analysis(&self) -> &ErrorAnalysis {
        match self {
            Self::Created(analysis) | Self::Existing(analysis) => analysis,
        }
    }
}

/// Counters for a classification batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassifyReport {
    /// Records classified in this batch.
    pub analyzed: usize,
    /// Records that already had an analysis.
    pub existing: usize,
    /// Records whose classification failed.
    pub failed: usize,
}

/// Classifies log records through a reasoning provider.
#[derive(Clone)]
pub struct ClassifierService<L, A, C>
where
    L: LogRecordRepository,
    A: AnalysisRepository,
    C: Clock + Send + Sync,
{
    records: Arc<L>,
    analyses: Arc<A>,
    provider: Arc<dyn ReasoningProvider>,
    clock: Arc<C>,
}

impl<L, A, C> ClassifierService<L, A, C>
where
    L: LogRecordRepository,
    A: AnalysisRepository,
    C: Clock + Send + Sync,
{
    /// Creates a classifier service.
    #[must_use]
    pub fn new(
        records: Arc<L>,
        analyses: Arc<A>,
        provider: Arc<dyn ReasoningProvider>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            records,
            analyses,
            provider,
            clock,
        }
    }

    /// Classifies one record.
    ///
    /// A record that already has an analysis is never classified again; the
    /// stored analysis is returned instead. Provider and parse failures leave
    /// the record unanalyzed.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifierError`] when the record is missing, a repository
    /// fails, the provider fails, or the reply cannot be interpreted.
    pub async fn classify(&self, record_id: RecordId) -> ClassifierResult<ClassifyOutcome> {
        let record = self
            .records
            .find_by_id(record_id)
            .await?
            .ok_or(ClassifierError::RecordNotFound(record_id))?;

        if let Some(existing) = self.analyses.find_by_record(record_id).await? {
            if !record.is_analyzed() {
                self.records.mark_analyzed(record_id).await?;
            }
            debug!(%record_id, analysis_id = %existing.id(), "record already analysed");
            return Ok(ClassifyOutcome::Existing(existing));
        }

        let request = ReasoningRequest::new(SYSTEM_PROMPT, build_prompt(&record));
        let reply = self.provider.complete(&request).await?;
        let judgement = parse_judgement(&reply)?;
        let analysis = ErrorAnalysis::new_pending(record_id, judgement, self.clock.as_ref());

        match self.analyses.store(&analysis).await {
            Ok(()) => {}
            Err(AnalysisRepositoryError::DuplicateRecord(_)) => {
                let stored = self
                    .analyses
                    .find_by_record(record_id)
                    .await?
                    .unwrap_or(analysis);
                self.records.mark_analyzed(record_id).await?;
                return Ok(ClassifyOutcome::Existing(stored));
            }
            Err(err) => return Err(err.into()),
        }
        self.records.mark_analyzed(record_id).await?;

        info!(
            %record_id,
            analysis_id = %analysis.id(),
            severity = %analysis.judgement().severity,
            confidence = %analysis.judgement().confidence,
            "record classified"
        );
        Ok(ClassifyOutcome::Created(analysis))
    }

    /// Classifies up to `limit` unanalyzed records at or above `min_level`,
    /// most recent first.
    ///
    /// Per-record failures are logged and counted.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifierError::Records`] when candidates cannot be listed.
    pub async fn classify_batch(
        &self,
        min_level: LogLevel,
        limit: usize,
    ) -> ClassifierResult<ClassifyReport> {
        let candidates = self.records.list_unanalyzed(min_level, limit).await?;
        let mut report = ClassifyReport::default();

        for record in candidates {
            match self.classify(record.id()).await {
                Ok(ClassifyOutcome::Created(_)) => {
                    report.analyzed = report.analyzed.saturating_add(1);
                }
                Ok(ClassifyOutcome::Existing(_)) => {
                    report.existing = report.existing.saturating_add(1);
                }
                Err(err) => {
                    warn!(record_id = %record.id(), error = %err, "classification failed");
                    report.failed = report.failed.saturating_add(1);
                }
            }
        }

        info!(
            analyzed = report.analyzed,
            existing = report.existing,
            failed = report.failed,
            "classification batch finished"
        );
        Ok(report)
    }
}
