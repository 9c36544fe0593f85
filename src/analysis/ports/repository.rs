//! Repository port for error analysis persistence.

use crate::analysis::domain::{AnalysisId, Confidence, ErrorAnalysis, Severity};
use crate::log_record::domain::RecordId;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for analysis repository operations.
pub type AnalysisRepositoryResult<T> = Result<T, AnalysisRepositoryError>;

/// Selection criteria for task materialisation candidates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateFilter {
    /// Minimum severity, inclusive.
    pub min_severity: Severity,
    /// Minimum confidence, inclusive.
    pub min_confidence: Confidence,
    /// Maximum number of candidates.
    pub limit: usize,
}

/// Error analysis persistence contract.
#[async_trait]
pub trait AnalysisRepository: Send + Sync {
    /// Stores a new analysis.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisRepositoryError::DuplicateRecord`] when the record
    /// already has an analysis.
    async fn store(&self, analysis: &ErrorAnalysis) -> AnalysisRepositoryResult<()>;

    /// Replaces a stored analysis.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisRepositoryError::NotFound`] when the analysis does
    /// not exist.
    async fn update(&self, analysis: &ErrorAnalysis) -> AnalysisRepositoryResult<()>;

    /// Finds an analysis by identifier.
    async fn find_by_id(&self, id: AnalysisId) -> AnalysisRepositoryResult<Option<ErrorAnalysis>>;

    /// Finds the analysis of a log record.
    async fn find_by_record(
        &self,
        record_id: RecordId,
    ) -> AnalysisRepositoryResult<Option<ErrorAnalysis>>;

    /// Lists pending, actionable analyses passing `filter`, most recent first.
    async fn list_candidates(
        &self,
        filter: &CandidateFilter,
    ) -> AnalysisRepositoryResult<Vec<ErrorAnalysis>>;
}

/// Errors returned by analysis repository implementations.
#[derive(Debug, Clone, Error)]
pub enum AnalysisRepositoryError {
    /// The log record already has an analysis.
    #[error("log record {0} already has an analysis")]
    DuplicateRecord(RecordId),

    /// The analysis was not found.
    #[error("analysis not found: {0}")]
    NotFound(AnalysisId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl AnalysisRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
