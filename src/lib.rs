//! Faultline: log ingestion, AI-assisted error triage and task creation.
//!
//! Faultline collects error records from rotated local log files and a
//! remote error tracker, asks a reasoning provider to judge each one, and
//! turns actionable judgements into tasks, optionally escalating urgent ones
//! to an external issue tracker.
//!
//! # Architecture
//!
//! Each bounded context follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, APIs, etc.)
//!
//! # Modules
//!
//! - [`log_record`]: Line parsing, local scanning, remote fetch and
//!   deduplicating persistence
//! - [`analysis`]: Severity classification through reasoning providers
//! - [`task`]: Task materialisation and issue escalation
//! - [`tag`]: Tag registry and unused-tag cleanup
//! - [`pipeline`]: Stage orchestration for a triage run
//! - [`config`]: File and environment configuration

pub mod analysis;
pub mod config;
pub mod log_record;
pub mod pipeline;
pub mod tag;
pub mod task;

#[cfg(test)]
mod test_support;
