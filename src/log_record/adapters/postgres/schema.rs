//! Diesel schema for log record persistence.

diesel::table! {
    /// Structured log records from local files and the remote tracker.
    log_records (id) {
        /// Internal record identifier.
        id -> Uuid,
        /// Event timestamp.
        timestamp -> Timestamptz,
        /// Uppercase level name.
        #[max_length = 20]
        level -> Varchar,
        /// Emitting logger name.
        #[max_length = 255]
        logger -> Varchar,
        /// Message text.
        message -> Text,
        /// Exception type, empty when absent.
        #[max_length = 255]
        exception_type -> Varchar,
        /// Exception value, empty when absent.
        exception_value -> Text,
        /// Stack trace, empty when absent.
        stack_trace -> Text,
        /// Collection source.
        #[max_length = 20]
        source -> Varchar,
        /// Natural-identity digest for local records.
        #[max_length = 64]
        fingerprint -> Nullable<Varchar>,
        /// Remote tracker event identifier.
        #[max_length = 255]
        external_event_id -> Nullable<Varchar>,
        /// Remote tracker issue identifier.
        #[max_length = 255]
        remote_issue_id -> Nullable<Varchar>,
        /// Whether the record has been classified.
        analyzed -> Bool,
        /// Ingestion timestamp.
        created_at -> Timestamptz,
    }
}
