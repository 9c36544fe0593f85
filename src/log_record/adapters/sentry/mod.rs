//! Adapters for a Sentry-compatible error tracker.

mod client;
mod event;

pub use client::{SentryClient, SentryClientError};
pub use event::{normalize_event, render_frames};
