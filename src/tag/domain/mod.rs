//! Domain model for tags.

mod tag;

pub use tag::{Tag, TagDomainError, TagId, TagName};
