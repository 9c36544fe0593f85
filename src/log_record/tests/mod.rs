//! Unit tests for log record ingestion.
