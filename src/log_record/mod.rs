//! Log record ingestion.
//!
//! Turns local log files and remote tracker events into structured
//! [`domain::LogRecord`] values and persists them idempotently. The module
//! follows hexagonal architecture:
//!
//! - Domain types, the line grammar and exception mining in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
