//! Step definitions for error triage scenarios.

pub mod given;
pub mod then;
pub mod when;
pub mod world;
