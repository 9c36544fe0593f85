//! `PostgreSQL` adapters for analysis persistence.

mod models;
mod repository;
mod schema;

pub use repository::PostgresAnalysisRepository;
