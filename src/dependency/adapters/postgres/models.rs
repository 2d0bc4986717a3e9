//! Diesel row models for dependency edge persistence.

use super::schema::task_dependencies;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for dependency edges.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = task_dependencies)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DependencyRow {
    /// Project of the predecessor task.
    pub predecessor_project_id: String,
    /// Number of the predecessor task.
    pub predecessor_task_number: i64,
    /// Project of the successor task.
    pub successor_project_id: String,
    /// Number of the successor task.
    pub successor_task_number: i64,
    /// Dependency type tag.
    pub dependency_type: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Insert model for dependency edges.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_dependencies)]
pub struct NewDependencyRow {
    /// Project of the predecessor task.
    pub predecessor_project_id: String,
    /// Number of the predecessor task.
    pub predecessor_task_number: i64,
    /// Project of the successor task.
    pub successor_project_id: String,
    /// Number of the successor task.
    pub successor_task_number: i64,
    /// Dependency type tag.
    pub dependency_type: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
