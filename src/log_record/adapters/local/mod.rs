//! Filesystem adapter that scans rotated local log files.

mod scanner;

pub use scanner::{LocalLogScanner, ScanError, ScanFilter, ScanOutcome};
