//! Diesel schema for analysis persistence.

diesel::table! {
    /// Classifier output, one row per log record.
    error_analyses (id) {
        /// Internal analysis identifier.
        id -> Uuid,
        /// Analysed log record.
        log_record_id -> Uuid,
        /// Severity name.
        #[max_length = 20]
        severity -> Varchar,
        /// Whether the finding is actionable.
        is_actionable -> Bool,
        /// Summary text.
        summary -> Text,
        /// Root cause text.
        root_cause -> Text,
        /// Recommended action text.
        recommended_action -> Text,
        /// Confidence in `[0, 1]`.
        confidence -> Float8,
        /// Lifecycle status.
        #[max_length = 20]
        status -> Varchar,
        /// Approving actor.
        #[max_length = 255]
        approved_by -> Nullable<Varchar>,
        /// Approval timestamp.
        approved_at -> Nullable<Timestamptz>,
        /// Materialised task.
        task_id -> Nullable<Uuid>,
        /// Issue provider.
        #[max_length = 20]
        issue_provider -> Nullable<Varchar>,
        /// Issue repository in `owner/repo` form.
        #[max_length = 255]
        issue_repository -> Nullable<Varchar>,
        /// Issue number.
        issue_number -> Nullable<Int8>,
        /// Issue URL.
        issue_url -> Nullable<Text>,
        /// Issue synchronisation timestamp.
        issue_synced_at -> Nullable<Timestamptz>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Latest update timestamp.
        updated_at -> Timestamptz,
    }
}
