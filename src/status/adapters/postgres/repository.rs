//! `PostgreSQL` repository implementation for transition history storage.

use super::{
    models::{NewTransitionRow, TransitionRow},
    schema::task_status_transitions,
};
use crate::status::{
    domain::{
        Actor, PersistedTransitionRecord, TaskStatus, TransitionRecord, TransitionRecordId,
        TriggerKind,
    },
    ports::{
        TransitionRepository, TransitionRepositoryError, TransitionRepositoryResult,
        verify_append,
    },
};
use crate::task::domain::TaskIdentity;
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sql_types::Text;

/// `PostgreSQL` connection pool type used by transition adapters.
pub type TransitionPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed transition history repository.
///
/// Appends run in a transaction holding a per-task advisory lock, so the
/// chain check and the insert see the same history.
#[derive(Debug, Clone)]
pub struct PostgresTransitionRepository {
    pool: TransitionPgPool,
}

impl PostgresTransitionRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TransitionPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TransitionRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TransitionRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TransitionRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TransitionRepositoryError::persistence)?
    }
}

impl From<DieselError> for TransitionRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl TransitionRepository for PostgresTransitionRepository {
    async fn append_transition(&self, record: &TransitionRecord) -> TransitionRepositoryResult<()> {
        let new_row = to_new_row(record)?;
        let appended = record.clone();

        self.run_blocking(move |connection| {
            connection.transaction::<_, TransitionRepositoryError, _>(|tx| {
                lock_task_history(tx, appended.task())?;
                let latest = latest_record(tx, &new_row.project_id, new_row.task_number)?;
                verify_append(latest.as_ref(), &appended)?;

                diesel::insert_into(task_status_transitions::table)
                    .values(&new_row)
                    .execute(tx)
                    .map_err(|err| match err {
                        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                            TransitionRepositoryError::DuplicateRecord(appended.id())
                        }
                        other => TransitionRepositoryError::persistence(other),
                    })?;
                Ok(())
            })
        })
        .await
    }

    async fn load_transitions(
        &self,
        task: &TaskIdentity,
    ) -> TransitionRepositoryResult<Vec<TransitionRecord>> {
        let (project_id, task_number) = to_columns(task)?;

        self.run_blocking(move |connection| {
            let rows = task_status_transitions::table
                .filter(task_status_transitions::project_id.eq(project_id))
                .filter(task_status_transitions::task_number.eq(task_number))
                .order(task_status_transitions::position.asc())
                .select(TransitionRow::as_select())
                .load::<TransitionRow>(connection)?;
            rows.into_iter().map(row_to_record).collect()
        })
        .await
    }

    async fn find_transition(
        &self,
        id: TransitionRecordId,
    ) -> TransitionRepositoryResult<Option<TransitionRecord>> {
        self.run_blocking(move |connection| {
            task_status_transitions::table
                .find(id.into_inner())
                .select(TransitionRow::as_select())
                .first::<TransitionRow>(connection)
                .optional()?
                .map(row_to_record)
                .transpose()
        })
        .await
    }

    async fn record_approval(
        &self,
        id: TransitionRecordId,
        approver: &Actor,
        approved_at: DateTime<Utc>,
    ) -> TransitionRepositoryResult<TransitionRecord> {
        let approving_actor = approver.clone();

        self.run_blocking(move |connection| {
            connection.transaction::<_, TransitionRepositoryError, _>(|tx| {
                let row = task_status_transitions::table
                    .find(id.into_inner())
                    .select(TransitionRow::as_select())
                    .for_update()
                    .first::<TransitionRow>(tx)
                    .optional()?
                    .ok_or(TransitionRepositoryError::NotFound(id))?;
                let approved = row_to_record(row)?
                    .approved(approving_actor.clone(), approved_at)
                    .map_err(|_| TransitionRepositoryError::NotPending(id))?;

                diesel::update(task_status_transitions::table.find(id.into_inner()))
                    .set((
                        task_status_transitions::approved_by.eq(Some(approving_actor.as_str())),
                        task_status_transitions::approved_at.eq(Some(approved_at)),
                    ))
                    .execute(tx)?;
                Ok(approved)
            })
        })
        .await
    }
}

fn lock_task_history(
    connection: &mut PgConnection,
    task: &TaskIdentity,
) -> TransitionRepositoryResult<()> {
    diesel::sql_query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
        .bind::<Text, _>(task.to_string())
        .execute(connection)?;
    Ok(())
}

fn latest_record(
    connection: &mut PgConnection,
    project_id: &str,
    task_number: i64,
) -> TransitionRepositoryResult<Option<TransitionRecord>> {
    task_status_transitions::table
        .filter(task_status_transitions::project_id.eq(project_id))
        .filter(task_status_transitions::task_number.eq(task_number))
        .order(task_status_transitions::position.desc())
        .select(TransitionRow::as_select())
        .first::<TransitionRow>(connection)
        .optional()?
        .map(row_to_record)
        .transpose()
}

fn to_columns(task: &TaskIdentity) -> TransitionRepositoryResult<(String, i64)> {
    let number =
        i64::try_from(task.task_number().value()).map_err(TransitionRepositoryError::persistence)?;
    Ok((task.project_id().as_str().to_owned(), number))
}

fn parse_status(value: &str) -> TransitionRepositoryResult<TaskStatus> {
    TaskStatus::try_from(value).map_err(TransitionRepositoryError::persistence)
}

fn parse_actor(value: String) -> TransitionRepositoryResult<Actor> {
    Actor::new(value).map_err(TransitionRepositoryError::persistence)
}

fn to_new_row(record: &TransitionRecord) -> TransitionRepositoryResult<NewTransitionRow> {
    let (project_id, task_number) = to_columns(record.task())?;

    Ok(NewTransitionRow {
        id: record.id().into_inner(),
        project_id,
        task_number,
        from_status: record.from_status().map(|status| status.as_str().to_owned()),
        to_status: record.to_status().as_str().to_owned(),
        actor: record.actor().as_str().to_owned(),
        automated: record.automated(),
        trigger_kind: record.trigger_kind().as_str().to_owned(),
        reason: record.reason().map(str::to_owned),
        occurred_at: record.occurred_at(),
        duration_in_previous_status_ms: record
            .duration_in_previous_status()
            .map(|duration| duration.num_milliseconds()),
        requires_approval: record.requires_approval(),
        approved_by: record.approved_by().map(|actor| actor.as_str().to_owned()),
        approved_at: record.approved_at(),
    })
}

fn row_to_record(row: TransitionRow) -> TransitionRepositoryResult<TransitionRecord> {
    let TransitionRow {
        id,
        project_id,
        task_number,
        from_status,
        to_status,
        actor,
        automated,
        trigger_kind,
        reason,
        occurred_at,
        duration_in_previous_status_ms,
        requires_approval,
        approved_by,
        approved_at,
    } = row;

    let number = u64::try_from(task_number).map_err(TransitionRepositoryError::persistence)?;
    let data = PersistedTransitionRecord {
        id: TransitionRecordId::from_uuid(id),
        task: TaskIdentity::from_parts(&project_id, number)
            .map_err(TransitionRepositoryError::persistence)?,
        from_status: from_status.as_deref().map(parse_status).transpose()?,
        to_status: parse_status(&to_status)?,
        actor: parse_actor(actor)?,
        automated,
        trigger_kind: TriggerKind::try_from(trigger_kind.as_str())
            .map_err(TransitionRepositoryError::persistence)?,
        reason,
        occurred_at,
        duration_in_previous_status: duration_in_previous_status_ms.map(TimeDelta::milliseconds),
        requires_approval,
        approved_by: approved_by.map(parse_actor).transpose()?,
        approved_at,
    };
    Ok(TransitionRecord::from_persisted(data))
}
