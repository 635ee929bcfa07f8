//! Driving port for the project aggregate.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::error::Error;
use crate::domain::ids::{ProjectId, UserId};
use crate::domain::project::{
    Project, ProjectDescription, ProjectPatch, ProjectStatus, ProjectTitle, RoadmapEntry,
};
use crate::domain::user::User;

/// Compact identity reference embedded in enriched payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserRefPayload {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

impl From<&User> for UserRefPayload {
    fn from(user: &User) -> Self {
        Self {
            id: *user.id(),
            name: user.name().as_ref().to_owned(),
            email: user.email().as_ref().to_owned(),
        }
    }
}

impl UserRefPayload {
    /// Fallback reference for an identifier the store could not resolve.
    pub fn unresolved(id: UserId) -> Self {
        Self {
            id,
            name: String::new(),
            email: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapEntryPayload {
    pub milestone: String,
    pub due_date: DateTime<Utc>,
}

impl From<&RoadmapEntry> for RoadmapEntryPayload {
    fn from(entry: &RoadmapEntry) -> Self {
        Self {
            milestone: entry.milestone().to_owned(),
            due_date: entry.due_date(),
        }
    }
}

/// Enriched project projection returned by every project read.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPayload {
    pub id: ProjectId,
    pub title: String,
    pub description: String,
    pub status: ProjectStatus,
    pub created_by: UserRefPayload,
    pub members: Vec<UserRefPayload>,
    pub member_count: usize,
    pub tags: Vec<String>,
    pub roadmap: Vec<RoadmapEntryPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProjectPayload {
    /// Project the aggregate with identity references resolved by the caller.
    pub fn enriched(project: &Project, created_by: UserRefPayload, members: Vec<UserRefPayload>) -> Self {
        Self {
            id: *project.id(),
            title: project.title().as_ref().to_owned(),
            description: project.description().as_ref().to_owned(),
            status: project.status(),
            created_by,
            members,
            member_count: project.member_count(),
            tags: project.tags().to_vec(),
            roadmap: project.roadmap().iter().map(RoadmapEntryPayload::from).collect(),
            start_date: project.start_date(),
            target_date: project.target_date(),
            created_at: project.created_at(),
            updated_at: project.updated_at(),
        }
    }
}

/// Boundary-validated request to create a project.
#[derive(Debug, Clone)]
pub struct CreateProjectRequest {
    pub actor: UserId,
    pub title: ProjectTitle,
    pub description: ProjectDescription,
    pub status: Option<ProjectStatus>,
    pub tags: Vec<String>,
    pub roadmap: Vec<RoadmapEntry>,
    pub members: Vec<UserId>,
    pub start_date: Option<DateTime<Utc>>,
    pub target_date: Option<DateTime<Utc>>,
}

/// Full-replacement update scoped to the fields the caller supplied.
#[derive(Debug, Clone)]
pub struct UpdateProjectRequest {
    pub actor: UserId,
    pub project: ProjectId,
    pub patch: ProjectPatch,
}

/// Outcome of a project deletion, including its task cascade.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDeletedPayload {
    pub id: ProjectId,
    pub deleted_tasks: u64,
}

/// Domain use-case port for project lifecycle operations.
#[async_trait]
pub trait ProjectOps: Send + Sync {
    async fn create(&self, request: CreateProjectRequest) -> Result<ProjectPayload, Error>;

    /// Projects the actor collaborates on, newest first.
    async fn list_mine(&self, actor: UserId) -> Result<Vec<ProjectPayload>, Error>;

    async fn get(&self, actor: UserId, project: ProjectId) -> Result<ProjectPayload, Error>;

    async fn update(&self, request: UpdateProjectRequest) -> Result<ProjectPayload, Error>;

    /// Delete a project and every task that belongs to it.
    async fn delete(&self, actor: UserId, project: ProjectId)
    -> Result<ProjectDeletedPayload, Error>;
}
