//! Port contracts for log record ingestion.
//!
//! Ports define infrastructure-agnostic interfaces used by log record
//! services.

pub mod remote;
pub mod repository;

pub use remote::{IssueQuery, RemoteIssue, RemoteIssueSource, RemoteSourceError, RemoteSourceResult};
pub use repository::{LogRecordRepository, LogRecordRepositoryError, LogRecordRepositoryResult};
