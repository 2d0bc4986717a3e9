//! `PostgreSQL` repository implementation for dependency edge storage.

use super::{
    models::{DependencyRow, NewDependencyRow},
    schema::task_dependencies,
};
use crate::dependency::{
    domain::{DependencyEdge, DependencyType, PersistedDependencyEdge},
    ports::{DependencyEdgeRepository, DependencyRepositoryError, DependencyRepositoryResult},
};
use crate::task::domain::TaskIdentity;
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by dependency adapters.
pub type DependencyPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed dependency edge repository.
#[derive(Debug, Clone)]
pub struct PostgresDependencyRepository {
    pool: DependencyPgPool,
}

impl PostgresDependencyRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: DependencyPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> DependencyRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> DependencyRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(DependencyRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(DependencyRepositoryError::persistence)?
    }
}

#[async_trait]
impl DependencyEdgeRepository for PostgresDependencyRepository {
    async fn save_edge(&self, edge: &DependencyEdge) -> DependencyRepositoryResult<()> {
        let new_row = to_new_row(edge)?;
        let predecessor = edge.predecessor().clone();
        let successor = edge.successor().clone();

        self.run_blocking(move |connection| {
            diesel::insert_into(task_dependencies::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        DependencyRepositoryError::DuplicateEdge {
                            predecessor: predecessor.clone(),
                            successor: successor.clone(),
                        }
                    }
                    _ => DependencyRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn delete_edge(
        &self,
        predecessor: &TaskIdentity,
        successor: &TaskIdentity,
    ) -> DependencyRepositoryResult<bool> {
        let (predecessor_project, predecessor_number) = to_columns(predecessor)?;
        let (successor_project, successor_number) = to_columns(successor)?;

        self.run_blocking(move |connection| {
            let deleted = diesel::delete(
                task_dependencies::table
                    .filter(task_dependencies::predecessor_project_id.eq(predecessor_project))
                    .filter(task_dependencies::predecessor_task_number.eq(predecessor_number))
                    .filter(task_dependencies::successor_project_id.eq(successor_project))
                    .filter(task_dependencies::successor_task_number.eq(successor_number)),
            )
            .execute(connection)
            .map_err(DependencyRepositoryError::persistence)?;
            Ok(deleted > 0)
        })
        .await
    }

    async fn load_edges(&self) -> DependencyRepositoryResult<Vec<DependencyEdge>> {
        self.run_blocking(|connection| {
            let rows = task_dependencies::table
                .order(task_dependencies::created_at.asc())
                .select(DependencyRow::as_select())
                .load::<DependencyRow>(connection)
                .map_err(DependencyRepositoryError::persistence)?;
            rows.into_iter().map(row_to_edge).collect()
        })
        .await
    }
}

fn to_columns(task: &TaskIdentity) -> DependencyRepositoryResult<(String, i64)> {
    let number =
        i64::try_from(task.task_number().value()).map_err(DependencyRepositoryError::persistence)?;
    Ok((task.project_id().as_str().to_owned(), number))
}

fn from_columns(project_id: &str, task_number: i64) -> DependencyRepositoryResult<TaskIdentity> {
    let number = u64::try_from(task_number).map_err(DependencyRepositoryError::persistence)?;
    TaskIdentity::from_parts(project_id, number).map_err(DependencyRepositoryError::persistence)
}

fn to_new_row(edge: &DependencyEdge) -> DependencyRepositoryResult<NewDependencyRow> {
    let (predecessor_project_id, predecessor_task_number) = to_columns(edge.predecessor())?;
    let (successor_project_id, successor_task_number) = to_columns(edge.successor())?;

    Ok(NewDependencyRow {
        predecessor_project_id,
        predecessor_task_number,
        successor_project_id,
        successor_task_number,
        dependency_type: edge.dependency_type().as_str().to_owned(),
        created_at: edge.created_at(),
    })
}

fn row_to_edge(row: DependencyRow) -> DependencyRepositoryResult<DependencyEdge> {
    let DependencyRow {
        predecessor_project_id,
        predecessor_task_number,
        successor_project_id,
        successor_task_number,
        dependency_type,
        created_at,
    } = row;

    let data = PersistedDependencyEdge {
        predecessor: from_columns(&predecessor_project_id, predecessor_task_number)?,
        successor: from_columns(&successor_project_id, successor_task_number)?,
        dependency_type: DependencyType::new(dependency_type)
            .map_err(DependencyRepositoryError::persistence)?,
        created_at,
    };
    Ok(DependencyEdge::from_persisted(data))
}
