//! Port for task persistence.

use async_trait::async_trait;

use crate::domain::ids::{ProjectId, TaskId, UserId};
use crate::domain::task::{Comment, Task};

use super::define_port_error;

define_port_error! {
    /// Errors raised by task repository adapters.
    pub enum TaskPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "task repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "task repository query failed: {message}",
    }
}

/// Port for writing and reading tasks and their embedded comment logs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Persist a new task.
    async fn insert(&self, task: &Task) -> Result<(), TaskPersistenceError>;

    /// Find a task by id, comment log included.
    async fn find_by_id(&self, id: &TaskId) -> Result<Option<Task>, TaskPersistenceError>;

    /// List tasks under a project, oldest first.
    async fn list_for_project(
        &self,
        project: &ProjectId,
    ) -> Result<Vec<Task>, TaskPersistenceError>;

    /// List tasks assigned to a user across projects, due date ascending
    /// with undated tasks last.
    async fn list_assigned_to(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Task>, TaskPersistenceError>;

    /// Replace the stored document with `task` (last write wins at the
    /// document level).
    async fn update(&self, task: &Task) -> Result<(), TaskPersistenceError>;

    /// Delete a single task.
    async fn delete(&self, id: &TaskId) -> Result<(), TaskPersistenceError>;

    /// Delete every task under `project`; the explicit cascade used by
    /// project deletion. Returns the number of tasks removed.
    async fn delete_for_project(
        &self,
        project: &ProjectId,
    ) -> Result<u64, TaskPersistenceError>;

    /// Append a comment to the end of the task's log. Returns whether the
    /// task still existed.
    async fn append_comment(
        &self,
        id: &TaskId,
        comment: &Comment,
    ) -> Result<bool, TaskPersistenceError>;
}
