//! `PostgreSQL` adapters for the tag registry.

mod models;
mod repository;
mod schema;

pub use repository::PostgresTagRepository;
