//! Port contracts for error analysis.

pub mod reasoning;
pub mod repository;

pub use reasoning::{ReasoningError, ReasoningProvider, ReasoningRequest, ReasoningResult};
pub use repository::{
    AnalysisRepository, AnalysisRepositoryError, AnalysisRepositoryResult, CandidateFilter,
};
