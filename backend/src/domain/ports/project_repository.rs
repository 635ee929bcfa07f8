//! Port for project persistence.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::ids::{ProjectId, UserId};
use crate::domain::project::Project;

use super::define_port_error;

define_port_error! {
    /// Errors raised by project repository adapters.
    pub enum ProjectPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "project repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "project repository query failed: {message}",
    }
}

/// Port for writing and reading projects.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Persist a new project.
    async fn insert(&self, project: &Project) -> Result<(), ProjectPersistenceError>;

    /// Find a project by id.
    async fn find_by_id(
        &self,
        id: &ProjectId,
    ) -> Result<Option<Project>, ProjectPersistenceError>;

    /// Bulk-fetch projects for display projections. Unknown ids are simply
    /// absent from the result.
    async fn find_by_ids(
        &self,
        ids: &[ProjectId],
    ) -> Result<HashMap<ProjectId, Project>, ProjectPersistenceError>;

    /// List projects the user created or is a member of, newest first.
    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Project>, ProjectPersistenceError>;

    /// Replace the stored document with `project` (last write wins at the
    /// document level; callers authorise against freshly loaded state).
    async fn update(&self, project: &Project) -> Result<(), ProjectPersistenceError>;

    /// Delete a project. Task cascade is explicit application logic in the
    /// service layer, not a storage trigger.
    async fn delete(&self, id: &ProjectId) -> Result<(), ProjectPersistenceError>;

    /// Idempotent set-add of `user_id` to the project's member list. The
    /// creator is never added. Returns whether the membership set changed.
    async fn add_member(
        &self,
        id: &ProjectId,
        user_id: &UserId,
    ) -> Result<bool, ProjectPersistenceError>;
}
