//! In-memory implementations of the repository ports.
//!
//! These back the integration harness so end-to-end scenarios run without a
//! database. Semantics mirror the Diesel adapters: idempotent member adds,
//! compare-and-set invite responses, and ordered listings.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use backend::domain::ids::{InviteId, ProjectId, TaskId, UserId};
use backend::domain::invite::{Invite, InviteStatus};
use backend::domain::ports::{
    CredentialRecord, InvitePersistenceError, InviteRepository, ProjectPersistenceError,
    ProjectRepository, TaskPersistenceError, TaskRepository, UserPersistenceError, UserRepository,
};
use backend::domain::project::Project;
use backend::domain::task::{Comment, Task};
use backend::domain::user::{EmailAddress, User};

#[derive(Default)]
pub struct InMemoryUsers {
    records: Mutex<Vec<(User, Option<String>)>>,
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn insert<'a>(
        &self,
        user: &User,
        password_hash: Option<&'a str>,
    ) -> Result<(), UserPersistenceError> {
        let mut records = self.records.lock().expect("users lock");
        if records.iter().any(|(u, _)| u.email() == user.email()) {
            return Err(UserPersistenceError::duplicate_email());
        }
        records.push((user.clone(), password_hash.map(str::to_owned)));
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let records = self.records.lock().expect("users lock");
        Ok(records
            .iter()
            .find(|(u, _)| u.id() == id)
            .map(|(u, _)| u.clone()))
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        let records = self.records.lock().expect("users lock");
        Ok(records
            .iter()
            .find(|(u, _)| u.email() == email)
            .map(|(u, _)| u.clone()))
    }

    async fn find_credentials(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<CredentialRecord>, UserPersistenceError> {
        let records = self.records.lock().expect("users lock");
        Ok(records
            .iter()
            .find(|(u, _)| u.email() == email)
            .map(|(u, hash)| CredentialRecord {
                user: u.clone(),
                password_hash: hash.clone(),
            }))
    }

    async fn resolve(&self, ids: &[UserId]) -> Result<HashMap<UserId, User>, UserPersistenceError> {
        let records = self.records.lock().expect("users lock");
        Ok(records
            .iter()
            .filter(|(u, _)| ids.contains(u.id()))
            .map(|(u, _)| (*u.id(), u.clone()))
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryProjects {
    projects: Mutex<HashMap<ProjectId, Project>>,
}

#[async_trait]
impl ProjectRepository for InMemoryProjects {
    async fn insert(&self, project: &Project) -> Result<(), ProjectPersistenceError> {
        self.projects
            .lock()
            .expect("projects lock")
            .insert(*project.id(), project.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &ProjectId) -> Result<Option<Project>, ProjectPersistenceError> {
        Ok(self.projects.lock().expect("projects lock").get(id).cloned())
    }

    async fn find_by_ids(
        &self,
        ids: &[ProjectId],
    ) -> Result<HashMap<ProjectId, Project>, ProjectPersistenceError> {
        let projects = self.projects.lock().expect("projects lock");
        Ok(ids
            .iter()
            .filter_map(|id| projects.get(id).map(|p| (*id, p.clone())))
            .collect())
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Project>, ProjectPersistenceError> {
        let projects = self.projects.lock().expect("projects lock");
        let mut mine: Vec<Project> = projects
            .values()
            .filter(|p| p.is_collaborator(user_id))
            .cloned()
            .collect();
        mine.sort_by_key(|p| std::cmp::Reverse(p.created_at()));
        Ok(mine)
    }

    async fn update(&self, project: &Project) -> Result<(), ProjectPersistenceError> {
        self.projects
            .lock()
            .expect("projects lock")
            .insert(*project.id(), project.clone());
        Ok(())
    }

    async fn delete(&self, id: &ProjectId) -> Result<(), ProjectPersistenceError> {
        self.projects.lock().expect("projects lock").remove(id);
        Ok(())
    }

    async fn add_member(
        &self,
        id: &ProjectId,
        user_id: &UserId,
    ) -> Result<bool, ProjectPersistenceError> {
        let mut projects = self.projects.lock().expect("projects lock");
        Ok(projects
            .get_mut(id)
            .is_some_and(|project| project.add_member(*user_id, Utc::now())))
    }
}

#[derive(Default)]
pub struct InMemoryInvites {
    invites: Mutex<HashMap<InviteId, Invite>>,
}

#[async_trait]
impl InviteRepository for InMemoryInvites {
    async fn insert(&self, invite: &Invite) -> Result<(), InvitePersistenceError> {
        self.invites
            .lock()
            .expect("invites lock")
            .insert(*invite.id(), invite.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &InviteId) -> Result<Option<Invite>, InvitePersistenceError> {
        Ok(self.invites.lock().expect("invites lock").get(id).cloned())
    }

    async fn find_pending(
        &self,
        receiver: &UserId,
        project: &ProjectId,
    ) -> Result<Option<Invite>, InvitePersistenceError> {
        let invites = self.invites.lock().expect("invites lock");
        Ok(invites
            .values()
            .find(|i| i.receiver() == receiver && i.project() == project && i.is_pending())
            .cloned())
    }

    async fn list_for_receiver(
        &self,
        receiver: &UserId,
    ) -> Result<Vec<Invite>, InvitePersistenceError> {
        let invites = self.invites.lock().expect("invites lock");
        let mut inbox: Vec<Invite> = invites
            .values()
            .filter(|i| i.receiver() == receiver)
            .cloned()
            .collect();
        inbox.sort_by_key(|i| std::cmp::Reverse(i.created_at()));
        Ok(inbox)
    }

    async fn mark_responded(
        &self,
        id: &InviteId,
        status: InviteStatus,
    ) -> Result<bool, InvitePersistenceError> {
        let mut invites = self.invites.lock().expect("invites lock");
        let Some(invite) = invites.get_mut(id) else {
            return Ok(false);
        };
        if !invite.is_pending() {
            return Ok(false);
        }
        let refreshed = Invite::from_parts(
            *invite.id(),
            *invite.sender(),
            *invite.receiver(),
            *invite.project(),
            status,
            invite.created_at(),
        );
        *invite = refreshed;
        Ok(true)
    }
}

#[derive(Default)]
pub struct InMemoryTasks {
    tasks: Mutex<HashMap<TaskId, Task>>,
}

#[async_trait]
impl TaskRepository for InMemoryTasks {
    async fn insert(&self, task: &Task) -> Result<(), TaskPersistenceError> {
        self.tasks
            .lock()
            .expect("tasks lock")
            .insert(*task.id(), task.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &TaskId) -> Result<Option<Task>, TaskPersistenceError> {
        Ok(self.tasks.lock().expect("tasks lock").get(id).cloned())
    }

    async fn list_for_project(
        &self,
        project: &ProjectId,
    ) -> Result<Vec<Task>, TaskPersistenceError> {
        let tasks = self.tasks.lock().expect("tasks lock");
        let mut listed: Vec<Task> = tasks
            .values()
            .filter(|t| t.project() == project)
            .cloned()
            .collect();
        listed.sort_by_key(Task::created_at);
        Ok(listed)
    }

    async fn list_assigned_to(&self, user_id: &UserId) -> Result<Vec<Task>, TaskPersistenceError> {
        let tasks = self.tasks.lock().expect("tasks lock");
        let mut listed: Vec<Task> = tasks
            .values()
            .filter(|t| t.is_assignee(user_id))
            .cloned()
            .collect();
        // Due date ascending, undated last, creation order as tiebreak.
        listed.sort_by_key(|t| (t.due_date().is_none(), t.due_date(), t.created_at()));
        Ok(listed)
    }

    async fn update(&self, task: &Task) -> Result<(), TaskPersistenceError> {
        self.tasks
            .lock()
            .expect("tasks lock")
            .insert(*task.id(), task.clone());
        Ok(())
    }

    async fn delete(&self, id: &TaskId) -> Result<(), TaskPersistenceError> {
        self.tasks.lock().expect("tasks lock").remove(id);
        Ok(())
    }

    async fn delete_for_project(
        &self,
        project: &ProjectId,
    ) -> Result<u64, TaskPersistenceError> {
        let mut tasks = self.tasks.lock().expect("tasks lock");
        let before = tasks.len();
        tasks.retain(|_, t| t.project() != project);
        Ok((before - tasks.len()) as u64)
    }

    async fn append_comment(
        &self,
        id: &TaskId,
        comment: &Comment,
    ) -> Result<bool, TaskPersistenceError> {
        let mut tasks = self.tasks.lock().expect("tasks lock");
        let Some(task) = tasks.get_mut(id) else {
            return Ok(false);
        };
        task.append_comment(comment.clone(), Utc::now());
        Ok(true)
    }
}
