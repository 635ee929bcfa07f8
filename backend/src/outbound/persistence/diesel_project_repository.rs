//! Diesel-backed project repository.
//!
//! The member list is a UUID array column and the roadmap is a JSONB
//! document, so a project loads and stores as a single row.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ids::{ProjectId, UserId};
use crate::domain::ports::{ProjectPersistenceError, ProjectRepository};
use crate::domain::project::{
    Project, ProjectDescription, ProjectDraft, ProjectStatus, ProjectTitle, RoadmapEntry,
};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewProjectRow, ProjectChangeset, ProjectRow};
use super::pool::{DbPool, PoolError};
use super::schema::projects;

diesel::define_sql_function! {
    /// Postgres `array_append`; diesel ships no dsl wrapper for it.
    fn array_append(
        array: diesel::sql_types::Array<diesel::sql_types::Uuid>,
        element: diesel::sql_types::Uuid,
    ) -> diesel::sql_types::Array<diesel::sql_types::Uuid>;
}

/// PostgreSQL implementation of [`ProjectRepository`].
#[derive(Clone)]
pub struct DieselProjectRepository {
    pool: DbPool,
}

impl DieselProjectRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> ProjectPersistenceError {
    map_pool_error(error, ProjectPersistenceError::connection)
}

fn diesel_error(error: diesel::result::Error) -> ProjectPersistenceError {
    map_diesel_error(
        error,
        ProjectPersistenceError::query,
        ProjectPersistenceError::connection,
    )
}

fn encode_roadmap(roadmap: &[RoadmapEntry]) -> Result<serde_json::Value, ProjectPersistenceError> {
    serde_json::to_value(roadmap)
        .map_err(|err| ProjectPersistenceError::query(format!("roadmap failed to encode: {err}")))
}

fn decode_roadmap(value: serde_json::Value) -> Result<Vec<RoadmapEntry>, ProjectPersistenceError> {
    serde_json::from_value(value)
        .map_err(|err| ProjectPersistenceError::query(format!("stored roadmap invalid: {err}")))
}

fn row_to_project(row: ProjectRow) -> Result<Project, ProjectPersistenceError> {
    let ProjectRow {
        id,
        title,
        description,
        created_by,
        members,
        status,
        tags,
        roadmap,
        start_date,
        target_date,
        created_at,
        updated_at,
    } = row;

    let title = ProjectTitle::new(&title).map_err(|err| {
        ProjectPersistenceError::query(format!("stored project title invalid: {err}"))
    })?;
    let description = ProjectDescription::new(&description).map_err(|err| {
        ProjectPersistenceError::query(format!("stored project description invalid: {err}"))
    })?;
    let status: ProjectStatus = status.parse().map_err(|err| {
        ProjectPersistenceError::query(format!("stored project status invalid: {err}"))
    })?;

    Ok(Project::new(ProjectDraft {
        id: ProjectId::from_uuid(id),
        title,
        description,
        created_by: UserId::from_uuid(created_by),
        members: members.into_iter().map(UserId::from_uuid).collect(),
        status,
        tags,
        roadmap: decode_roadmap(roadmap)?,
        start_date,
        target_date,
        created_at,
        updated_at,
    }))
}

fn member_uuids(project: &Project) -> Vec<uuid::Uuid> {
    project
        .members()
        .iter()
        .map(|member| *member.as_uuid())
        .collect()
}

#[async_trait]
impl ProjectRepository for DieselProjectRepository {
    async fn insert(&self, project: &Project) -> Result<(), ProjectPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let row = NewProjectRow {
            id: *project.id().as_uuid(),
            title: project.title().as_ref(),
            description: project.description().as_ref(),
            created_by: *project.created_by().as_uuid(),
            members: member_uuids(project),
            status: project.status().as_str(),
            tags: project.tags(),
            roadmap: encode_roadmap(project.roadmap())?,
            start_date: project.start_date(),
            target_date: project.target_date(),
            created_at: project.created_at(),
            updated_at: project.updated_at(),
        };

        diesel::insert_into(projects::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(())
    }

    async fn find_by_id(&self, id: &ProjectId) -> Result<Option<Project>, ProjectPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let row = projects::table
            .find(id.as_uuid())
            .select(ProjectRow::as_select())
            .first::<ProjectRow>(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;

        row.map(row_to_project).transpose()
    }

    async fn find_by_ids(
        &self,
        ids: &[ProjectId],
    ) -> Result<HashMap<ProjectId, Project>, ProjectPersistenceError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let uuids: Vec<uuid::Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let rows = projects::table
            .filter(projects::id.eq_any(uuids))
            .select(ProjectRow::as_select())
            .load::<ProjectRow>(&mut conn)
            .await
            .map_err(diesel_error)?;

        rows.into_iter()
            .map(|row| row_to_project(row).map(|project| (*project.id(), project)))
            .collect()
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Project>, ProjectPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let uuid = *user_id.as_uuid();
        let rows = projects::table
            .filter(
                projects::created_by
                    .eq(uuid)
                    .or(projects::members.contains(vec![uuid])),
            )
            .order(projects::created_at.desc())
            .select(ProjectRow::as_select())
            .load::<ProjectRow>(&mut conn)
            .await
            .map_err(diesel_error)?;

        rows.into_iter().map(row_to_project).collect()
    }

    async fn update(&self, project: &Project) -> Result<(), ProjectPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let changeset = ProjectChangeset {
            title: project.title().as_ref(),
            description: project.description().as_ref(),
            members: member_uuids(project),
            status: project.status().as_str(),
            tags: project.tags(),
            roadmap: encode_roadmap(project.roadmap())?,
            start_date: project.start_date(),
            target_date: project.target_date(),
            updated_at: project.updated_at(),
        };

        diesel::update(projects::table.find(project.id().as_uuid()))
            .set(changeset)
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(())
    }

    async fn delete(&self, id: &ProjectId) -> Result<(), ProjectPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        diesel::delete(projects::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(())
    }

    async fn add_member(
        &self,
        id: &ProjectId,
        user_id: &UserId,
    ) -> Result<bool, ProjectPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        // Guarded append: the WHERE clause keeps the operation idempotent and
        // never adds the creator to the member array.
        let uuid = *user_id.as_uuid();
        let affected = diesel::update(
            projects::table
                .find(id.as_uuid())
                .filter(diesel::dsl::not(projects::members.contains(vec![uuid])))
                .filter(projects::created_by.ne(uuid)),
        )
        .set((
            projects::members.eq(array_append(projects::members, uuid)),
            projects::updated_at.eq(chrono::Utc::now()),
        ))
        .execute(&mut conn)
        .await
        .map_err(diesel_error)?;

        Ok(affected > 0)
    }
}
