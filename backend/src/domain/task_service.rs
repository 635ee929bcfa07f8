//! Task lifecycle domain service.
//!
//! Authorisation always consults the owning project's current state, loaded
//! alongside the task. Status changes travel a channel of their own: only
//! the assignee may move a task between states, and the project creator is
//! deliberately not exempt.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::access::{
    CollaborationPolicy, DenyReason, ProjectAction, TaskAction, authorize_project, authorize_task,
};
use crate::domain::error::Error;
use crate::domain::ids::{ProjectId, TaskId, UserId};
use crate::domain::ports::{
    AppendCommentRequest, CommentPayload, CreateTaskRequest, ProjectRepository, TaskDetailPayload,
    TaskOps, TaskPayload, TaskRepository, UpdateTaskRequest, UserRepository, UserRefPayload,
};
use crate::domain::project::Project;
use crate::domain::task::{Comment, Task, TaskDraft, TaskStatus};
use crate::domain::user::User;

fn deny(reason: DenyReason) -> Error {
    match reason {
        DenyReason::NotCollaborator => Error::not_found("task not found"),
        reason => Error::forbidden(reason.to_string()),
    }
}

/// Task service over the task, project and user stores.
#[derive(Clone)]
pub struct TaskService<T, P, U> {
    tasks: Arc<T>,
    projects: Arc<P>,
    users: Arc<U>,
    policy: CollaborationPolicy,
}

impl<T, P, U> TaskService<T, P, U> {
    /// Create the service with its collaborators and access policy.
    pub fn new(tasks: Arc<T>, projects: Arc<P>, users: Arc<U>, policy: CollaborationPolicy) -> Self {
        Self {
            tasks,
            projects,
            users,
            policy,
        }
    }
}

fn reference(identities: &HashMap<UserId, User>, id: &UserId) -> UserRefPayload {
    identities
        .get(id)
        .map_or_else(|| UserRefPayload::unresolved(*id), UserRefPayload::from)
}

impl<T, P, U> TaskService<T, P, U>
where
    T: TaskRepository,
    P: ProjectRepository,
    U: UserRepository,
{
    async fn load_task(&self, id: &TaskId) -> Result<(Task, Project), Error> {
        let task = self
            .tasks
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found("task not found"))?;
        let project = self
            .projects
            .find_by_id(task.project())
            .await?
            .ok_or_else(|| Error::internal("task references a missing project"))?;
        Ok((task, project))
    }

    async fn load_project(&self, id: &ProjectId, actor: &UserId) -> Result<Project, Error> {
        let project = self
            .projects
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found("project not found"))?;
        authorize_project(self.policy, actor, &project, ProjectAction::CreateTask)
            .map_err(|_| Error::not_found("project not found"))?;
        Ok(project)
    }

    async fn enrich_all(&self, tasks: &[Task]) -> Result<Vec<TaskPayload>, Error> {
        let mut ids: Vec<UserId> = Vec::new();
        for task in tasks {
            if let Some(assignee) = task.assigned_to()
                && !ids.contains(assignee)
            {
                ids.push(*assignee);
            }
        }
        let identities = self.users.resolve(&ids).await?;
        Ok(tasks
            .iter()
            .map(|task| {
                let assigned_to = task
                    .assigned_to()
                    .map(|assignee| reference(&identities, assignee));
                TaskPayload::enriched(task, assigned_to)
            })
            .collect())
    }

    async fn enrich_one(&self, task: &Task) -> Result<TaskPayload, Error> {
        let mut payloads = self.enrich_all(std::slice::from_ref(task)).await?;
        payloads
            .pop()
            .ok_or_else(|| Error::internal("projection produced no payload"))
    }

    async fn enrich_detail(&self, task: &Task) -> Result<TaskDetailPayload, Error> {
        let mut ids: Vec<UserId> = Vec::new();
        if let Some(assignee) = task.assigned_to() {
            ids.push(*assignee);
        }
        for comment in task.comments() {
            if !ids.contains(comment.author()) {
                ids.push(*comment.author());
            }
        }
        let identities = self.users.resolve(&ids).await?;

        let assigned_to = task
            .assigned_to()
            .map(|assignee| reference(&identities, assignee));
        let comments = task
            .comments()
            .iter()
            .map(|comment| {
                CommentPayload::enriched(comment, reference(&identities, comment.author()))
            })
            .collect();
        Ok(TaskDetailPayload {
            task: TaskPayload::enriched(task, assigned_to),
            comments,
        })
    }
}

#[async_trait]
impl<T, P, U> TaskOps for TaskService<T, P, U>
where
    T: TaskRepository,
    P: ProjectRepository,
    U: UserRepository,
{
    async fn create(&self, request: CreateTaskRequest) -> Result<TaskPayload, Error> {
        let project = self.load_project(&request.project, &request.actor).await?;
        if let Some(assignee) = &request.assigned_to
            && !project.is_collaborator(assignee)
        {
            return Err(Error::invalid_request(
                "assignee must be a collaborator on the project",
            ));
        }

        let now = Utc::now();
        let task = Task::new(TaskDraft {
            id: TaskId::random(),
            title: request.title,
            description: request.description,
            project: request.project,
            assigned_to: request.assigned_to,
            status: request.status.unwrap_or_default(),
            priority: request.priority.unwrap_or_default(),
            tags: request.tags,
            start_date: request.start_date,
            due_date: request.due_date,
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        });
        self.tasks.insert(&task).await?;
        tracing::info!(task_id = %task.id(), project_id = %project.id(), "created task");
        self.enrich_one(&task).await
    }

    async fn list_for_project(
        &self,
        actor: UserId,
        project: ProjectId,
    ) -> Result<Vec<TaskPayload>, Error> {
        let loaded = self
            .projects
            .find_by_id(&project)
            .await?
            .ok_or_else(|| Error::not_found("project not found"))?;
        authorize_project(self.policy, &actor, &loaded, ProjectAction::View)
            .map_err(|_| Error::not_found("project not found"))?;
        let tasks = self.tasks.list_for_project(&project).await?;
        self.enrich_all(&tasks).await
    }

    async fn get(&self, actor: UserId, task: TaskId) -> Result<TaskDetailPayload, Error> {
        let (task, project) = self.load_task(&task).await?;
        authorize_task(&actor, &project, &task, TaskAction::View).map_err(deny)?;
        self.enrich_detail(&task).await
    }

    async fn list_assigned(&self, actor: UserId) -> Result<Vec<TaskPayload>, Error> {
        let tasks = self.tasks.list_assigned_to(&actor).await?;
        self.enrich_all(&tasks).await
    }

    async fn update_status(
        &self,
        actor: UserId,
        task: TaskId,
        status: TaskStatus,
    ) -> Result<TaskPayload, Error> {
        let (mut task, project) = self.load_task(&task).await?;
        authorize_task(&actor, &project, &task, TaskAction::UpdateStatus).map_err(deny)?;
        task.set_status(status, Utc::now());
        self.tasks.update(&task).await?;
        self.enrich_one(&task).await
    }

    async fn update(&self, request: UpdateTaskRequest) -> Result<TaskPayload, Error> {
        let (mut task, project) = self.load_task(&request.task).await?;
        authorize_task(&request.actor, &project, &task, TaskAction::Edit).map_err(deny)?;
        if let Some(Some(assignee)) = &request.patch.assigned_to
            && !project.is_collaborator(assignee)
        {
            return Err(Error::invalid_request(
                "assignee must be a collaborator on the project",
            ));
        }
        task.apply_patch(request.patch, Utc::now());
        self.tasks.update(&task).await?;
        self.enrich_one(&task).await
    }

    async fn delete(&self, actor: UserId, task: TaskId) -> Result<(), Error> {
        let (task, project) = self.load_task(&task).await?;
        authorize_task(&actor, &project, &task, TaskAction::Delete).map_err(deny)?;
        self.tasks.delete(task.id()).await?;
        tracing::info!(task_id = %task.id(), "deleted task");
        Ok(())
    }

    async fn append_comment(
        &self,
        request: AppendCommentRequest,
    ) -> Result<CommentPayload, Error> {
        let (task, project) = self.load_task(&request.task).await?;
        authorize_task(&request.actor, &project, &task, TaskAction::Comment).map_err(deny)?;

        let comment = Comment::new(request.actor, request.text, request.mentions, Utc::now())
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        if !self.tasks.append_comment(task.id(), &comment).await? {
            return Err(Error::not_found("task not found"));
        }

        let identities = self.users.resolve(&[request.actor]).await?;
        Ok(CommentPayload::enriched(
            &comment,
            reference(&identities, &request.actor),
        ))
    }
}

#[cfg(test)]
#[path = "task_service_tests.rs"]
mod tests;
