//! Domain model for classifier output.
//!
//! An [`ErrorAnalysis`] pairs a log record with a [`Judgement`] and tracks
//! whether the finding has been approved, materialised as a task, or
//! escalated to an external issue.

mod analysis;
mod error;
mod ids;
mod judgement;
mod severity;
mod status;

pub use analysis::{ErrorAnalysis, PersistedAnalysisData};
pub use error::{
    AnalysisDomainError, InvalidConfidence, ParseAnalysisStatusError, ParseSeverityError,
};
pub use ids::AnalysisId;
pub use judgement::Judgement;
pub use severity::{Confidence, Severity};
pub use status::AnalysisStatus;
