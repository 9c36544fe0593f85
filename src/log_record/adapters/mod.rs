//! Adapter implementations for log record ports.
//!
//! - [`memory`]: in-memory persistence for tests and dry runs
//! - [`postgres`]: Diesel-backed persistence
//! - [`local`]: rotated log file scanning
//! - [`sentry`]: remote error tracker client and event normalisation

pub mod local;
pub mod memory;
pub mod postgres;
pub mod sentry;
