//! Port contracts for work items.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod issue_tracker;
pub mod repository;

pub use issue_tracker::{
    CreatedIssue, IssueTracker, IssueTrackerError, IssueTrackerResult, NewIssue,
};
pub use repository::{TaskRepository, TaskRepositoryError, TaskRepositoryResult};
