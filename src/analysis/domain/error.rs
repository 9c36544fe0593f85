//! Error types for analysis domain validation and parsing.

use super::{AnalysisId, AnalysisStatus};
use thiserror::Error;

/// Errors returned by analysis lifecycle operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AnalysisDomainError {
    /// The requested status transition is not permitted.
    #[error("analysis {id} cannot move from {from} to {to}")]
    InvalidTransition {
        /// Analysis identifier.
        id: AnalysisId,
        /// Current status.
        from: AnalysisStatus,
        /// Requested status.
        to: AnalysisStatus,
    },

    /// The approving actor name is empty.
    #[error("approving actor must not be empty")]
    EmptyActor,

    /// An issue is already linked to the analysis.
    #[error("analysis {0} already has a linked issue")]
    IssueAlreadyLinked(AnalysisId),
}

/// Error returned while parsing a confidence value.
#[derive(Debug, Clone, Copy, Error, PartialEq)]
#[error("confidence {0} is outside [0, 1]")]
pub struct InvalidConfidence(pub f64);

/// Error returned while parsing severities.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown severity: {0}")]
pub struct ParseSeverityError(pub String);

/// Error returned while parsing analysis statuses.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown analysis status: {0}")]
pub struct ParseAnalysisStatusError(pub String);
