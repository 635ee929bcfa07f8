//! Diesel-backed task repository.
//!
//! The comment log lives in a JSONB column. Appends go through a single
//! `comments || $new` UPDATE so two concurrent commenters never overwrite
//! each other's entries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{Jsonb, Timestamptz, Uuid as SqlUuid};
use diesel_async::RunQueryDsl;

use crate::domain::ids::{ProjectId, TaskId, UserId};
use crate::domain::ports::{TaskPersistenceError, TaskRepository};
use crate::domain::task::{Comment, Task, TaskDraft, TaskPriority, TaskStatus, TaskTitle};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewTaskRow, TaskChangeset, TaskRow};
use super::pool::{DbPool, PoolError};
use super::schema::tasks;

/// PostgreSQL implementation of [`TaskRepository`].
#[derive(Clone)]
pub struct DieselTaskRepository {
    pool: DbPool,
}

impl DieselTaskRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> TaskPersistenceError {
    map_pool_error(error, TaskPersistenceError::connection)
}

fn diesel_error(error: diesel::result::Error) -> TaskPersistenceError {
    map_diesel_error(
        error,
        TaskPersistenceError::query,
        TaskPersistenceError::connection,
    )
}

fn encode_comments(comments: &[Comment]) -> Result<serde_json::Value, TaskPersistenceError> {
    serde_json::to_value(comments)
        .map_err(|err| TaskPersistenceError::query(format!("comments failed to encode: {err}")))
}

fn decode_comments(value: serde_json::Value) -> Result<Vec<Comment>, TaskPersistenceError> {
    serde_json::from_value(value)
        .map_err(|err| TaskPersistenceError::query(format!("stored comments invalid: {err}")))
}

fn row_to_task(row: TaskRow) -> Result<Task, TaskPersistenceError> {
    let TaskRow {
        id,
        project,
        title,
        description,
        status,
        priority,
        assigned_to,
        tags,
        comments,
        start_date,
        due_date,
        created_at,
        updated_at,
    } = row;

    let title = TaskTitle::new(&title)
        .map_err(|err| TaskPersistenceError::query(format!("stored task title invalid: {err}")))?;
    let status: TaskStatus = status
        .parse()
        .map_err(|err| TaskPersistenceError::query(format!("stored task status invalid: {err}")))?;
    let priority: TaskPriority = priority.parse().map_err(|err| {
        TaskPersistenceError::query(format!("stored task priority invalid: {err}"))
    })?;

    Ok(Task::new(TaskDraft {
        id: TaskId::from_uuid(id),
        title,
        description,
        project: ProjectId::from_uuid(project),
        assigned_to: assigned_to.map(UserId::from_uuid),
        status,
        priority,
        tags,
        start_date,
        due_date,
        comments: decode_comments(comments)?,
        created_at,
        updated_at,
    }))
}

#[async_trait]
impl TaskRepository for DieselTaskRepository {
    async fn insert(&self, task: &Task) -> Result<(), TaskPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let row = NewTaskRow {
            id: *task.id().as_uuid(),
            project: *task.project().as_uuid(),
            title: task.title().as_ref(),
            description: task.description(),
            status: task.status().as_str(),
            priority: task.priority().as_str(),
            assigned_to: task.assigned_to().map(|user| *user.as_uuid()),
            tags: task.tags(),
            comments: encode_comments(task.comments())?,
            start_date: task.start_date(),
            due_date: task.due_date(),
            created_at: task.created_at(),
            updated_at: task.updated_at(),
        };

        diesel::insert_into(tasks::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(())
    }

    async fn find_by_id(&self, id: &TaskId) -> Result<Option<Task>, TaskPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let row = tasks::table
            .find(id.as_uuid())
            .select(TaskRow::as_select())
            .first::<TaskRow>(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;

        row.map(row_to_task).transpose()
    }

    async fn list_for_project(
        &self,
        project: &ProjectId,
    ) -> Result<Vec<Task>, TaskPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let rows = tasks::table
            .filter(tasks::project.eq(project.as_uuid()))
            .order(tasks::created_at.asc())
            .select(TaskRow::as_select())
            .load::<TaskRow>(&mut conn)
            .await
            .map_err(diesel_error)?;

        rows.into_iter().map(row_to_task).collect()
    }

    async fn list_assigned_to(&self, user_id: &UserId) -> Result<Vec<Task>, TaskPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let rows = tasks::table
            .filter(tasks::assigned_to.eq(user_id.as_uuid()))
            .order((
                tasks::due_date.asc().nulls_last(),
                tasks::created_at.asc(),
            ))
            .select(TaskRow::as_select())
            .load::<TaskRow>(&mut conn)
            .await
            .map_err(diesel_error)?;

        rows.into_iter().map(row_to_task).collect()
    }

    async fn update(&self, task: &Task) -> Result<(), TaskPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let changeset = TaskChangeset {
            title: task.title().as_ref(),
            description: task.description(),
            status: task.status().as_str(),
            priority: task.priority().as_str(),
            assigned_to: task.assigned_to().map(|user| *user.as_uuid()),
            tags: task.tags(),
            start_date: task.start_date(),
            due_date: task.due_date(),
            updated_at: task.updated_at(),
        };

        diesel::update(tasks::table.find(task.id().as_uuid()))
            .set(changeset)
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(())
    }

    async fn delete(&self, id: &TaskId) -> Result<(), TaskPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        diesel::delete(tasks::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(())
    }

    async fn delete_for_project(
        &self,
        project: &ProjectId,
    ) -> Result<u64, TaskPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let deleted = diesel::delete(tasks::table.filter(tasks::project.eq(project.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(deleted.try_into().unwrap_or(u64::MAX))
    }

    async fn append_comment(
        &self,
        id: &TaskId,
        comment: &Comment,
    ) -> Result<bool, TaskPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        // Atomic in-database append; the new comment is concatenated onto the
        // stored array without a read-modify-write cycle.
        let appended = serde_json::to_value(std::slice::from_ref(comment))
            .map_err(|err| TaskPersistenceError::query(format!("comment failed to encode: {err}")))?;

        let affected = diesel::sql_query(
            "UPDATE tasks SET comments = comments || $1, updated_at = $2 WHERE id = $3",
        )
        .bind::<Jsonb, _>(appended)
        .bind::<Timestamptz, _>(Utc::now())
        .bind::<SqlUuid, _>(*id.as_uuid())
        .execute(&mut conn)
        .await
        .map_err(diesel_error)?;

        Ok(affected > 0)
    }
}
