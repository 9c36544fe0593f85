//! In-memory adapters for work items.

mod repository;

pub use repository::InMemoryTaskRepository;
