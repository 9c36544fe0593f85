//! Application services for log record ingestion.

mod ingest;
mod remote_fetch;

pub use ingest::{IngestReport, IngestService};
pub use remote_fetch::{RemoteFetchOutcome, RemoteFetchService};
