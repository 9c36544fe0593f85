//! Domain model for work items.
//!
//! A [`Task`] is created from an accepted analysis and may later be linked to
//! an issue in an external tracker.

mod error;
mod issue;
mod task;

pub use error::{ParseTaskStatusError, TaskDomainError};
pub use issue::{IssueLink, IssueNumber, IssueProvider, IssueRef, RepositoryFullName};
pub use task::{NewTask, PersistedTaskData, Task, TaskId, TaskStatus};
