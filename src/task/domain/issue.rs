//! Issue tracker references attached to escalated work items.

use super::TaskDomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU64;

/// Number of an issue within its repository.
///
/// Issue numbers are stored in `BIGINT` columns, so values above `i64::MAX`
/// are rejected along with zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct IssueNumber(NonZeroU64);

impl IssueNumber {
    /// Validates a tracker-assigned issue number.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidIssueNumber`] for zero or for values
    /// that do not fit a signed 64-bit column.
    pub fn new(value: u64) -> Result<Self, TaskDomainError> {
        let number = NonZeroU64::new(value)
            .filter(|number| i64::try_from(number.get()).is_ok())
            .ok_or(TaskDomainError::InvalidIssueNumber(value))?;
        Ok(Self(number))
    }

    /// Returns the number.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0.get()
    }
}

impl TryFrom<u64> for IssueNumber {
    type Error = TaskDomainError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<IssueNumber> for u64 {
    fn from(number: IssueNumber) -> Self {
        number.value()
    }
}

impl fmt::Display for IssueNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tracker repository addressed as `owner/name`.
///
/// Both segments are limited to the characters GitHub accepts in account and
/// repository slugs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RepositoryFullName {
    owner: String,
    name: String,
}

impl RepositoryFullName {
    /// Parses an `owner/name` pair, ignoring surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidRepository`] when either segment is
    /// missing or carries characters outside a repository slug.
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let Some((owner, name)) = raw.trim().split_once('/') else {
            return Err(TaskDomainError::InvalidRepository(raw));
        };
        if !is_slug(owner) || !is_slug(name) {
            return Err(TaskDomainError::InvalidRepository(raw));
        }
        Ok(Self {
            owner: owner.to_owned(),
            name: name.to_owned(),
        })
    }

    /// Returns the owning account.
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Returns the repository name without its owner.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

fn is_slug(segment: &str) -> bool {
    !segment.is_empty()
        && !matches!(segment, "." | "..")
        && segment
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.'))
}

impl TryFrom<String> for RepositoryFullName {
    type Error = TaskDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RepositoryFullName> for String {
    fn from(repository: RepositoryFullName) -> Self {
        repository.to_string()
    }
}

impl fmt::Display for RepositoryFullName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Supported issue trackers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueProvider {
    /// GitHub issues.
    #[serde(rename = "github")]
    GitHub,
}

impl IssueProvider {
    /// Returns provider name in canonical storage format.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GitHub => "github",
        }
    }
}

impl TryFrom<&str> for IssueProvider {
    type Error = TaskDomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "github" => Ok(Self::GitHub),
            _ => Err(TaskDomainError::InvalidIssueProvider(value.to_owned())),
        }
    }
}

impl fmt::Display for IssueProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical issue reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IssueRef {
    provider: IssueProvider,
    repository: RepositoryFullName,
    issue_number: IssueNumber,
}

impl IssueRef {
    /// Creates an issue reference from validated components.
    #[must_use]
    pub const fn new(
        provider: IssueProvider,
        repository: RepositoryFullName,
        issue_number: IssueNumber,
    ) -> Self {
        Self {
            provider,
            repository,
            issue_number,
        }
    }

    /// Creates an issue reference from raw stored values.
    ///
    /// # Errors
    ///
    /// Returns a [`TaskDomainError`] when any component is invalid.
    pub fn from_parts(
        provider: &str,
        repository: &str,
        issue_number: u64,
    ) -> Result<Self, TaskDomainError> {
        Ok(Self::new(
            IssueProvider::try_from(provider)?,
            RepositoryFullName::new(repository)?,
            IssueNumber::new(issue_number)?,
        ))
    }

    /// Returns the issue provider.
    #[must_use]
    pub const fn provider(&self) -> IssueProvider {
        self.provider
    }

    /// Returns the repository identifier.
    #[must_use]
    pub const fn repository(&self) -> &RepositoryFullName {
        &self.repository
    }

    /// Returns the issue number.
    #[must_use]
    pub const fn issue_number(&self) -> IssueNumber {
        self.issue_number
    }
}

impl fmt::Display for IssueRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.repository, self.issue_number)
    }
}

/// An issue filed for a work item, with the time it was last synchronised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueLink {
    issue_ref: IssueRef,
    url: String,
    synced_at: DateTime<Utc>,
}

impl IssueLink {
    /// Creates an issue link.
    #[must_use]
    pub fn new(issue_ref: IssueRef, url: impl Into<String>, synced_at: DateTime<Utc>) -> Self {
        Self {
            issue_ref,
            url: url.into(),
            synced_at,
        }
    }

    /// Returns the issue reference.
    #[must_use]
    pub const fn issue_ref(&self) -> &IssueRef {
        &self.issue_ref
    }

    /// Returns the issue's web URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the synchronisation timestamp.
    #[must_use]
    pub const fn synced_at(&self) -> DateTime<Utc> {
        self.synced_at
    }
}
