//! Unit tests for the analysis context.
