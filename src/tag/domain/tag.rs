//! Tag value objects and entity.

use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Errors returned while constructing tag values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TagDomainError {
    /// The tag name is empty after trimming.
    #[error("tag name must not be empty")]
    EmptyName,

    /// The tag name exceeds the storage limit.
    #[error("tag name '{0}' is longer than {max} characters", max = TagName::MAX_LENGTH)]
    NameTooLong(String),
}

/// Unique identifier for a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagId(Uuid);

impl TagId {
    /// Creates a new random tag identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a tag identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for TagId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Normalised tag name: trimmed, lowercase, at most 100 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TagName(String);

impl TagName {
    /// Longest accepted name.
    pub const MAX_LENGTH: usize = 100;

    /// Creates a validated tag name.
    ///
    /// # Errors
    ///
    /// Returns [`TagDomainError`] when the name is blank or too long.
    pub fn new(value: impl Into<String>) -> Result<Self, TagDomainError> {
        let raw = value.into();
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(TagDomainError::EmptyName);
        }
        if normalized.chars().count() > Self::MAX_LENGTH {
            return Err(TagDomainError::NameTooLong(raw));
        }
        Ok(Self(normalized))
    }

    /// Returns the name as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TagName {
    type Error = TagDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TagName> for String {
    fn from(name: TagName) -> Self {
        name.0
    }
}

impl AsRef<str> for TagName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TagName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Tag entity with its cached usage counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    id: TagId,
    name: TagName,
    usage_count: u64,
    created_at: DateTime<Utc>,
}

impl Tag {
    /// Creates an unused tag.
    #[must_use]
    pub fn new(name: TagName, clock: &impl Clock) -> Self {
        Self {
            id: TagId::new(),
            name,
            usage_count: 0,
            created_at: clock.utc(),
        }
    }

    /// Reconstructs a tag from persisted storage.
    #[must_use]
    pub const fn from_persisted(
        id: TagId,
        name: TagName,
        usage_count: u64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            usage_count,
            created_at,
        }
    }

    /// Returns the tag identifier.
    #[must_use]
    pub const fn id(&self) -> TagId {
        self.id
    }

    /// Returns the tag name.
    #[must_use]
    pub const fn name(&self) -> &TagName {
        &self.name
    }

    /// Returns the cached usage counter.
    ///
    /// The counter may lag behind the task relationships.
    #[must_use]
    pub const fn usage_count(&self) -> u64 {
        self.usage_count
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Replaces the cached usage counter.
    pub const fn set_usage_count(&mut self, usage_count: u64) {
        self.usage_count = usage_count;
    }
}
