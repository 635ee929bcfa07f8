//! Project lifecycle domain service.
//!
//! Existence is opaque: a caller who is not a collaborator gets the same
//! `not_found` for a real project as for an id that never existed.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::access::{
    CollaborationPolicy, DenyReason, ProjectAction, authorize_project,
};
use crate::domain::error::Error;
use crate::domain::ids::{ProjectId, UserId};
use crate::domain::ports::{
    CreateProjectRequest, ProjectDeletedPayload, ProjectOps, ProjectPayload, ProjectRepository,
    TaskRepository, UpdateProjectRequest, UserRepository, UserRefPayload,
};
use crate::domain::project::{Project, ProjectDraft};
use crate::domain::user::User;

fn deny(reason: DenyReason) -> Error {
    match reason {
        DenyReason::NotCollaborator => Error::not_found("project not found"),
        reason => Error::forbidden(reason.to_string()),
    }
}

/// Project service over the project, task and user stores.
#[derive(Clone)]
pub struct ProjectService<P, T, U> {
    projects: Arc<P>,
    tasks: Arc<T>,
    users: Arc<U>,
    policy: CollaborationPolicy,
}

impl<P, T, U> ProjectService<P, T, U> {
    /// Create the service with its collaborators and access policy.
    pub fn new(projects: Arc<P>, tasks: Arc<T>, users: Arc<U>, policy: CollaborationPolicy) -> Self {
        Self {
            projects,
            tasks,
            users,
            policy,
        }
    }
}

/// Build display references for a project from a resolved identity map.
/// Identities the store no longer knows degrade to bare ids rather than
/// failing the whole read.
pub(crate) fn project_payload(
    project: &Project,
    identities: &HashMap<UserId, User>,
) -> ProjectPayload {
    let reference = |id: &UserId| {
        identities
            .get(id)
            .map_or_else(|| UserRefPayload::unresolved(*id), UserRefPayload::from)
    };
    let created_by = reference(project.created_by());
    let members = project.members().iter().map(reference).collect();
    ProjectPayload::enriched(project, created_by, members)
}

impl<P, T, U> ProjectService<P, T, U>
where
    P: ProjectRepository,
    T: TaskRepository,
    U: UserRepository,
{
    async fn load(&self, id: &ProjectId) -> Result<Project, Error> {
        self.projects
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found("project not found"))
    }

    async fn enrich_all(&self, projects: &[Project]) -> Result<Vec<ProjectPayload>, Error> {
        let mut ids: Vec<UserId> = Vec::new();
        for project in projects {
            if !ids.contains(project.created_by()) {
                ids.push(*project.created_by());
            }
            for member in project.members() {
                if !ids.contains(member) {
                    ids.push(*member);
                }
            }
        }
        let identities = self.users.resolve(&ids).await?;
        Ok(projects
            .iter()
            .map(|project| project_payload(project, &identities))
            .collect())
    }

    async fn enrich_one(&self, project: &Project) -> Result<ProjectPayload, Error> {
        let mut payloads = self.enrich_all(std::slice::from_ref(project)).await?;
        payloads
            .pop()
            .ok_or_else(|| Error::internal("projection produced no payload"))
    }
}

#[async_trait]
impl<P, T, U> ProjectOps for ProjectService<P, T, U>
where
    P: ProjectRepository,
    T: TaskRepository,
    U: UserRepository,
{
    async fn create(&self, request: CreateProjectRequest) -> Result<ProjectPayload, Error> {
        let now = Utc::now();
        let project = Project::new(ProjectDraft {
            id: ProjectId::random(),
            title: request.title,
            description: request.description,
            created_by: request.actor,
            members: request.members,
            status: request.status.unwrap_or_default(),
            tags: request.tags,
            roadmap: request.roadmap,
            start_date: request.start_date,
            target_date: request.target_date,
            created_at: now,
            updated_at: now,
        });
        self.projects.insert(&project).await?;
        tracing::info!(project_id = %project.id(), "created project");
        self.enrich_one(&project).await
    }

    async fn list_mine(&self, actor: UserId) -> Result<Vec<ProjectPayload>, Error> {
        let projects = self.projects.list_for_user(&actor).await?;
        self.enrich_all(&projects).await
    }

    async fn get(&self, actor: UserId, project: ProjectId) -> Result<ProjectPayload, Error> {
        let project = self.load(&project).await?;
        authorize_project(self.policy, &actor, &project, ProjectAction::View).map_err(deny)?;
        self.enrich_one(&project).await
    }

    async fn update(&self, request: UpdateProjectRequest) -> Result<ProjectPayload, Error> {
        let mut project = self.load(&request.project).await?;
        authorize_project(self.policy, &request.actor, &project, ProjectAction::Update)
            .map_err(deny)?;
        project.apply_patch(request.patch, Utc::now());
        self.projects.update(&project).await?;
        self.enrich_one(&project).await
    }

    async fn delete(
        &self,
        actor: UserId,
        project: ProjectId,
    ) -> Result<ProjectDeletedPayload, Error> {
        let loaded = self.load(&project).await?;
        authorize_project(self.policy, &actor, &loaded, ProjectAction::Delete).map_err(deny)?;

        // Tasks go first so an interrupted delete never strands tasks whose
        // project is gone.
        let deleted_tasks = self.tasks.delete_for_project(&project).await?;
        self.projects.delete(&project).await?;
        tracing::info!(project_id = %project, deleted_tasks, "deleted project");
        Ok(ProjectDeletedPayload {
            id: project,
            deleted_tasks,
        })
    }
}

#[cfg(test)]
#[path = "project_service_tests.rs"]
mod tests;
