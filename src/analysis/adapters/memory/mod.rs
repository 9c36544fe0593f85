//! In-memory adapters for analysis persistence.

mod repository;

pub use repository::InMemoryAnalysisRepository;
