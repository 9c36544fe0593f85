//! Port contracts for the tag registry.

pub mod repository;

pub use repository::{TagRepository, TagRepositoryError, TagRepositoryResult};
