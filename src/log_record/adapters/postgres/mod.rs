//! `PostgreSQL` adapters for log record persistence.

mod models;
mod repository;
mod schema;

pub use repository::{LogRecordPgPool, PostgresLogRecordRepository};
