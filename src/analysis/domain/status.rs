//! Analysis lifecycle status.

use super::ParseAnalysisStatusError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of an error analysis.
///
/// `Pending → Approved → TaskCreated`, with `Pending → TaskCreated` for
/// automatic materialisation and `→ IssueCreated` when an issue is filed
/// without a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    /// Awaiting review or materialisation.
    Pending,
    /// Approved by an actor.
    Approved,
    /// A task has been created.
    TaskCreated,
    /// An issue has been filed directly.
    IssueCreated,
}

impl AnalysisStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::TaskCreated => "task_created",
            Self::IssueCreated => "issue_created",
        }
    }

    /// Returns `true` while the analysis may still produce a task.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Pending | Self::Approved)
    }

    /// Returns whether moving to `next` is permitted.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Approved)
                | (Self::Pending | Self::Approved, Self::TaskCreated | Self::IssueCreated)
        )
    }
}

impl TryFrom<&str> for AnalysisStatus {
    type Error = ParseAnalysisStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "task_created" => Ok(Self::TaskCreated),
            "issue_created" => Ok(Self::IssueCreated),
            _ => Err(ParseAnalysisStatusError(value.to_owned())),
        }
    }
}

impl fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
