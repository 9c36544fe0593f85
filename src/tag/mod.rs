//! Tag registry and unused-tag cleanup.
//!
//! Tags carry a cached usage counter next to the task relationships that
//! define true usage. The cleanup service deletes tags whose counter is zero
//! after re-checking the relationships.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
