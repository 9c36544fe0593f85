//! GitHub issue tracker adapter.

mod tracker;

pub use tracker::{GitHubIssueTracker, GitHubTrackerError};
