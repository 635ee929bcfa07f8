//! Driving port for the task aggregate and its embedded comment thread.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::error::Error;
use crate::domain::ids::{ProjectId, TaskId, UserId};
use crate::domain::ports::project_ops::UserRefPayload;
use crate::domain::task::{Comment, Task, TaskPatch, TaskPriority, TaskStatus, TaskTitle};

/// Task projection with its assignee resolved and comments summarised.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskPayload {
    pub id: TaskId,
    pub project: ProjectId,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<UserRefPayload>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    pub comment_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskPayload {
    pub fn enriched(task: &Task, assigned_to: Option<UserRefPayload>) -> Self {
        Self {
            id: *task.id(),
            project: *task.project(),
            title: task.title().as_ref().to_owned(),
            description: task.description().to_owned(),
            status: task.status(),
            priority: task.priority(),
            assigned_to,
            tags: task.tags().to_vec(),
            start_date: task.start_date(),
            due_date: task.due_date(),
            comment_count: task.comments().len(),
            created_at: task.created_at(),
            updated_at: task.updated_at(),
        }
    }
}

/// A comment with its author resolved to a display reference.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentPayload {
    pub author: UserRefPayload,
    pub text: String,
    pub mentions: Vec<UserId>,
    pub created_at: DateTime<Utc>,
}

impl CommentPayload {
    pub fn enriched(comment: &Comment, author: UserRefPayload) -> Self {
        Self {
            author,
            text: comment.text().to_owned(),
            mentions: comment.mentions().to_vec(),
            created_at: comment.created_at(),
        }
    }
}

/// Single-task read including the full comment thread.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskDetailPayload {
    #[serde(flatten)]
    pub task: TaskPayload,
    pub comments: Vec<CommentPayload>,
}

/// Boundary-validated request to create a task inside a project.
#[derive(Debug, Clone)]
pub struct CreateTaskRequest {
    pub actor: UserId,
    pub project: ProjectId,
    pub title: TaskTitle,
    pub description: String,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub assigned_to: Option<UserId>,
    pub tags: Vec<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
}

/// Full-replacement edit of a task's definition fields.
#[derive(Debug, Clone)]
pub struct UpdateTaskRequest {
    pub actor: UserId,
    pub task: TaskId,
    pub patch: TaskPatch,
}

#[derive(Debug, Clone)]
pub struct AppendCommentRequest {
    pub actor: UserId,
    pub task: TaskId,
    pub text: String,
    pub mentions: Vec<UserId>,
}

/// Domain use-case port for task lifecycle, status flow and comments.
#[async_trait]
pub trait TaskOps: Send + Sync {
    async fn create(&self, request: CreateTaskRequest) -> Result<TaskPayload, Error>;

    /// Tasks in a project, oldest first.
    async fn list_for_project(
        &self,
        actor: UserId,
        project: ProjectId,
    ) -> Result<Vec<TaskPayload>, Error>;

    async fn get(&self, actor: UserId, task: TaskId) -> Result<TaskDetailPayload, Error>;

    /// Tasks assigned to the actor across all projects, nearest due date
    /// first with undated tasks last.
    async fn list_assigned(&self, actor: UserId) -> Result<Vec<TaskPayload>, Error>;

    /// The assignee-exclusive status channel.
    async fn update_status(
        &self,
        actor: UserId,
        task: TaskId,
        status: TaskStatus,
    ) -> Result<TaskPayload, Error>;

    async fn update(&self, request: UpdateTaskRequest) -> Result<TaskPayload, Error>;

    async fn delete(&self, actor: UserId, task: TaskId) -> Result<(), Error>;

    async fn append_comment(&self, request: AppendCommentRequest)
    -> Result<CommentPayload, Error>;
}
