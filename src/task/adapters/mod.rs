//! Adapter implementations for task ports.

pub mod github;
pub mod memory;
pub mod postgres;
