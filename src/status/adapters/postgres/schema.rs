//! Diesel schema for transition history persistence.

diesel::table! {
    /// Append-only task status transitions.
    task_status_transitions (id) {
        /// Transition record identifier.
        id -> Uuid,
        /// Insertion order across all tasks.
        position -> Int8,
        /// Project of the task.
        #[max_length = 100]
        project_id -> Varchar,
        /// Task number within the project.
        task_number -> Int8,
        /// Status the task left.
        #[max_length = 50]
        from_status -> Nullable<Varchar>,
        /// Status the task entered.
        #[max_length = 50]
        to_status -> Varchar,
        /// Who requested the change.
        #[max_length = 255]
        actor -> Varchar,
        /// Whether a system made the change.
        automated -> Bool,
        /// What caused the change.
        #[max_length = 20]
        trigger_kind -> Varchar,
        /// Free-form justification.
        reason -> Nullable<Text>,
        /// Creation timestamp.
        occurred_at -> Timestamptz,
        /// Milliseconds spent in the previous status.
        duration_in_previous_status_ms -> Nullable<Int8>,
        /// Whether the change needed approval.
        requires_approval -> Bool,
        /// Approver, once approved.
        #[max_length = 255]
        approved_by -> Nullable<Varchar>,
        /// Approval timestamp, once approved.
        approved_at -> Nullable<Timestamptz>,
    }
}
