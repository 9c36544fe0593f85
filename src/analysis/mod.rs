//! Severity classification of log records.
//!
//! Unanalyzed records are described to a reasoning provider, whose JSON reply
//! becomes an [`domain::ErrorAnalysis`] awaiting materialisation. The layout
//! follows the other bounded contexts:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
