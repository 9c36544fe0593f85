//! In-memory adapters for the tag registry.

mod repository;

pub use repository::InMemoryTagRepository;
