//! Application services for the tag registry.

mod cleanup;

pub use cleanup::{CleanupError, CleanupReport, CleanupRequest, SkippedTag, TagCleanupService};
