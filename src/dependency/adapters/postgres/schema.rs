//! Diesel schema for dependency edge persistence.

diesel::table! {
    /// Directed precedence edges between tasks.
    task_dependencies (predecessor_project_id, predecessor_task_number, successor_project_id, successor_task_number) {
        /// Project of the task that must come first.
        #[max_length = 100]
        predecessor_project_id -> Varchar,
        /// Number of the task that must come first.
        predecessor_task_number -> Int8,
        /// Project of the task that must come after.
        #[max_length = 100]
        successor_project_id -> Varchar,
        /// Number of the task that must come after.
        successor_task_number -> Int8,
        /// Dependency type tag.
        #[max_length = 50]
        dependency_type -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}
