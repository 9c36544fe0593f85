//! Diesel schema for tags and task-tag relationships.

diesel::table! {
    /// Tag registry.
    tags (id) {
        /// Internal tag identifier.
        id -> Uuid,
        /// Normalised tag name.
        #[max_length = 100]
        name -> Varchar,
        /// Cached usage counter.
        usage_count -> Int8,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Task-tag relationships.
    task_tags (task_id, tag_id) {
        /// Tagged task.
        task_id -> Uuid,
        /// Applied tag.
        tag_id -> Uuid,
    }
}

diesel::allow_tables_to_appear_in_same_query!(tags, task_tags);
