//! In-memory adapters for log record persistence.

mod repository;

pub use repository::InMemoryLogRecordRepository;
