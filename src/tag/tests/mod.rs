//! Unit tests for the tag context.
