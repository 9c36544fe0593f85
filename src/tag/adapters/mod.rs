//! Adapter implementations for tag ports.

pub mod memory;
pub mod postgres;
