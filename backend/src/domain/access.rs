//! Access control decision function.
//!
//! A pure decision layer consulted by every mutating operation. Callers pass
//! the actor, a freshly loaded resource snapshot, and the requested action;
//! the answer is allow or a typed denial. Services translate denials into the
//! caller-visible error taxonomy, applying existence opacity where the actor
//! is not allowed to know the resource exists.
//!
//! The policy here is the coherent baseline collapsing the inconsistent
//! variants of earlier iterations: creator-only project mutation, an
//! assignee-exclusive status channel on tasks, and no separate admin role.

use serde::Deserialize;

use crate::domain::ids::UserId;
use crate::domain::project::Project;
use crate::domain::task::Task;

/// Requested operation on a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectAction {
    /// Read the project and its metadata.
    View,
    /// Change title, description, status, tags, roadmap, or dates.
    Update,
    /// Delete the project and cascade-delete its tasks.
    Delete,
    /// Send a membership invite for the project.
    Invite,
    /// Create a task under the project.
    CreateTask,
}

/// Requested operation on a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAction {
    /// Read the task, comment log included.
    View,
    /// Status-only change via the assignee channel.
    UpdateStatus,
    /// Full multi-field edit.
    Edit,
    /// Delete the task.
    Delete,
    /// Append a comment.
    Comment,
}

/// Why an action was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// The actor is neither creator nor member; they must not learn whether
    /// the resource exists.
    NotCollaborator,
    /// The actor can see the resource but the action is creator-only.
    CreatorOnly,
    /// The status channel belongs to the assignee alone.
    AssigneeOnly,
    /// The task has no assignee, so nobody may self-service its status.
    Unassigned,
    /// Members may not send invites under the active policy.
    InvitesRestrictedToCreator,
}

impl std::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            Self::NotCollaborator => "not a collaborator on this project",
            Self::CreatorOnly => "only the project creator may do this",
            Self::AssigneeOnly => "only the assignee may update task status",
            Self::Unassigned => "task has no assignee",
            Self::InvitesRestrictedToCreator => "only the project creator may send invites",
        };
        f.write_str(message)
    }
}

/// The outcome of an authorisation check.
pub type Decision = Result<(), DenyReason>;

/// Tunable collaboration policy. Resolves the "may any member invite?"
/// question explicitly instead of leaving it ambiguous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CollaborationPolicy {
    /// When set, plain members may send invites; otherwise only the creator.
    pub members_may_invite: bool,
}

#[expect(
    clippy::derivable_impls,
    reason = "the default is a policy decision worth spelling out"
)]
impl Default for CollaborationPolicy {
    fn default() -> Self {
        Self {
            members_may_invite: false,
        }
    }
}

/// Decide whether `actor` may perform `action` on `project`.
#[must_use = "a denial must be surfaced, never silently filtered"]
pub fn authorize_project(
    policy: CollaborationPolicy,
    actor: &UserId,
    project: &Project,
    action: ProjectAction,
) -> Decision {
    if !project.is_collaborator(actor) {
        return Err(DenyReason::NotCollaborator);
    }

    match action {
        ProjectAction::View | ProjectAction::CreateTask => Ok(()),
        ProjectAction::Update | ProjectAction::Delete => {
            if project.is_creator(actor) {
                Ok(())
            } else {
                Err(DenyReason::CreatorOnly)
            }
        }
        ProjectAction::Invite => {
            if project.is_creator(actor) || policy.members_may_invite {
                Ok(())
            } else {
                Err(DenyReason::InvitesRestrictedToCreator)
            }
        }
    }
}

/// Decide whether `actor` may perform `action` on `task`, given the task's
/// owning `project` snapshot.
#[must_use = "a denial must be surfaced, never silently filtered"]
pub fn authorize_task(
    actor: &UserId,
    project: &Project,
    task: &Task,
    action: TaskAction,
) -> Decision {
    if !project.is_collaborator(actor) {
        return Err(DenyReason::NotCollaborator);
    }

    match action {
        TaskAction::View | TaskAction::Comment => Ok(()),
        TaskAction::UpdateStatus => match task.assigned_to() {
            // Assignee-exclusive by design: even the creator is denied here.
            Some(assignee) if assignee == actor => Ok(()),
            Some(_) => Err(DenyReason::AssigneeOnly),
            None => Err(DenyReason::Unassigned),
        },
        TaskAction::Edit | TaskAction::Delete => {
            if project.is_creator(actor) {
                Ok(())
            } else {
                Err(DenyReason::CreatorOnly)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    //! Decision-table coverage for the access policy.
    use chrono::Utc;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::ids::{ProjectId, TaskId};
    use crate::domain::project::{
        ProjectDescription, ProjectDraft, ProjectStatus, ProjectTitle,
    };
    use crate::domain::task::{TaskDraft, TaskPriority, TaskStatus, TaskTitle};

    struct World {
        creator: UserId,
        member: UserId,
        outsider: UserId,
        project: Project,
    }

    #[fixture]
    fn world() -> World {
        let creator = UserId::random();
        let member = UserId::random();
        let now = Utc::now();
        let project = Project::new(ProjectDraft {
            id: ProjectId::random(),
            title: ProjectTitle::new("Launch").expect("valid title"),
            description: ProjectDescription::default(),
            created_by: creator,
            members: vec![member],
            status: ProjectStatus::default(),
            tags: Vec::new(),
            roadmap: Vec::new(),
            start_date: None,
            target_date: None,
            created_at: now,
            updated_at: now,
        });
        World {
            creator,
            member,
            outsider: UserId::random(),
            project,
        }
    }

    fn task(project: &Project, assigned_to: Option<UserId>) -> Task {
        let now = Utc::now();
        Task::new(TaskDraft {
            id: TaskId::random(),
            title: TaskTitle::new("Ship it").expect("valid title"),
            description: String::new(),
            project: *project.id(),
            assigned_to,
            status: TaskStatus::default(),
            priority: TaskPriority::default(),
            tags: Vec::new(),
            start_date: None,
            due_date: None,
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    #[rstest]
    #[case(ProjectAction::View)]
    #[case(ProjectAction::Update)]
    #[case(ProjectAction::Delete)]
    #[case(ProjectAction::Invite)]
    #[case(ProjectAction::CreateTask)]
    fn outsider_is_never_a_collaborator(world: World, #[case] action: ProjectAction) {
        let decision = authorize_project(
            CollaborationPolicy::default(),
            &world.outsider,
            &world.project,
            action,
        );
        assert_eq!(decision, Err(DenyReason::NotCollaborator));
    }

    #[rstest]
    #[case(ProjectAction::View, true)]
    #[case(ProjectAction::CreateTask, true)]
    #[case(ProjectAction::Update, false)]
    #[case(ProjectAction::Delete, false)]
    fn member_rights_stop_at_creator_only_actions(
        world: World,
        #[case] action: ProjectAction,
        #[case] allowed: bool,
    ) {
        let decision = authorize_project(
            CollaborationPolicy::default(),
            &world.member,
            &world.project,
            action,
        );
        assert_eq!(decision.is_ok(), allowed);
    }

    #[rstest]
    #[case(ProjectAction::View)]
    #[case(ProjectAction::Update)]
    #[case(ProjectAction::Delete)]
    #[case(ProjectAction::Invite)]
    #[case(ProjectAction::CreateTask)]
    fn creator_may_do_everything(world: World, #[case] action: ProjectAction) {
        let decision = authorize_project(
            CollaborationPolicy::default(),
            &world.creator,
            &world.project,
            action,
        );
        assert_eq!(decision, Ok(()));
    }

    #[rstest]
    fn member_invites_follow_the_policy_flag(world: World) {
        let restricted = authorize_project(
            CollaborationPolicy::default(),
            &world.member,
            &world.project,
            ProjectAction::Invite,
        );
        assert_eq!(restricted, Err(DenyReason::InvitesRestrictedToCreator));

        let open = authorize_project(
            CollaborationPolicy {
                members_may_invite: true,
            },
            &world.member,
            &world.project,
            ProjectAction::Invite,
        );
        assert_eq!(open, Ok(()));
    }

    #[rstest]
    fn status_channel_is_assignee_exclusive(world: World) {
        let task = task(&world.project, Some(world.member));

        assert_eq!(
            authorize_task(&world.member, &world.project, &task, TaskAction::UpdateStatus),
            Ok(())
        );
        // The creator holds every other right but not this one.
        assert_eq!(
            authorize_task(&world.creator, &world.project, &task, TaskAction::UpdateStatus),
            Err(DenyReason::AssigneeOnly)
        );
    }

    #[rstest]
    fn unassigned_task_denies_all_status_updates(world: World) {
        let task = task(&world.project, None);
        for actor in [world.creator, world.member] {
            assert_eq!(
                authorize_task(&actor, &world.project, &task, TaskAction::UpdateStatus),
                Err(DenyReason::Unassigned)
            );
        }
    }

    #[rstest]
    #[case(TaskAction::Edit)]
    #[case(TaskAction::Delete)]
    fn task_edit_and_delete_are_creator_only(world: World, #[case] action: TaskAction) {
        let task = task(&world.project, Some(world.member));
        assert_eq!(
            authorize_task(&world.creator, &world.project, &task, action),
            Ok(())
        );
        assert_eq!(
            authorize_task(&world.member, &world.project, &task, action),
            Err(DenyReason::CreatorOnly)
        );
    }

    #[rstest]
    #[case(TaskAction::View)]
    #[case(TaskAction::Comment)]
    fn members_may_view_and_comment(world: World, #[case] action: TaskAction) {
        let task = task(&world.project, None);
        assert_eq!(
            authorize_task(&world.member, &world.project, &task, action),
            Ok(())
        );
        assert_eq!(
            authorize_task(&world.outsider, &world.project, &task, action),
            Err(DenyReason::NotCollaborator)
        );
    }
}
