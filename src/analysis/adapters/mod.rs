//! Adapter implementations for analysis ports.

pub mod memory;
pub mod postgres;
pub mod reasoning;
