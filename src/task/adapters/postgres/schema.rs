//! Diesel schema for work item persistence.

diesel::table! {
    /// Work items created from accepted analyses.
    tasks (id) {
        /// Internal task identifier.
        id -> Uuid,
        /// Task title.
        #[max_length = 255]
        title -> Varchar,
        /// Markdown description.
        description -> Text,
        /// Work item status.
        #[max_length = 20]
        status -> Varchar,
        /// Tag names as a JSON array.
        tags -> Jsonb,
        /// Assignee.
        #[max_length = 255]
        assignee -> Nullable<Varchar>,
        /// Linked issue as a JSON object.
        issue -> Nullable<Jsonb>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
