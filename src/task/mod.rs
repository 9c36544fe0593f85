//! Work items created from error analyses.
//!
//! A task is materialised from an actionable analysis, either automatically
//! when it clears the severity and confidence thresholds or after manual
//! approval. High and critical tasks may additionally be filed as issues on
//! an external tracker. The module follows hexagonal architecture:
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
