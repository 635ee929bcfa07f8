//! Tests for the task service.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::{
    MockProjectRepository, MockTaskRepository, MockUserRepository,
};
use crate::domain::project::{ProjectDescription, ProjectDraft, ProjectStatus, ProjectTitle};
use crate::domain::task::{TaskPatch, TaskPriority, TaskTitle};
use crate::domain::user::{AuthProvider, EmailAddress, User, UserName};

fn sample_project(created_by: UserId, members: Vec<UserId>) -> Project {
    let now = Utc::now();
    Project::new(ProjectDraft {
        id: ProjectId::random(),
        title: ProjectTitle::new("Launch").expect("valid title"),
        description: ProjectDescription::default(),
        created_by,
        members,
        status: ProjectStatus::default(),
        tags: Vec::new(),
        roadmap: Vec::new(),
        start_date: None,
        target_date: None,
        created_at: now,
        updated_at: now,
    })
}

fn sample_task(project: ProjectId, assigned_to: Option<UserId>) -> Task {
    let now = Utc::now();
    Task::new(TaskDraft {
        id: TaskId::random(),
        title: TaskTitle::new("Ship it").expect("valid title"),
        description: String::new(),
        project,
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

fn identity(id: UserId, name: &str) -> User {
    User::new(
        id,
        UserName::new(name).expect("valid name"),
        EmailAddress::new(format!("{}@example.com", name.to_lowercase())).expect("valid email"),
        AuthProvider::Local,
        Utc::now(),
    )
}

fn empty_resolver() -> MockUserRepository {
    let mut users = MockUserRepository::new();
    users.expect_resolve().returning(|_| Ok(HashMap::new()));
    users
}

fn service(
    tasks: MockTaskRepository,
    projects: MockProjectRepository,
    users: MockUserRepository,
) -> TaskService<MockTaskRepository, MockProjectRepository, MockUserRepository> {
    TaskService::new(
        Arc::new(tasks),
        Arc::new(projects),
        Arc::new(users),
        CollaborationPolicy::default(),
    )
}

#[tokio::test]
async fn member_may_create_a_task() {
    let creator = UserId::random();
    let member = UserId::random();
    let project = sample_project(creator, vec![member]);
    let project_id = *project.id();

    let mut projects = MockProjectRepository::new();
    projects
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(project)));

    let mut tasks = MockTaskRepository::new();
    tasks
        .expect_insert()
        .withf(move |task| task.project() == &project_id && task.assigned_to() == Some(&member))
        .times(1)
        .return_once(|_| Ok(()));

    let mut users = MockUserRepository::new();
    let assignee = identity(member, "Grace");
    users
        .expect_resolve()
        .return_once(move |_| Ok(HashMap::from([(member, assignee)])));

    let service = service(tasks, projects, users);
    let payload = service
        .create(CreateTaskRequest {
            actor: member,
            project: project_id,
            title: TaskTitle::new("Ship it").expect("valid title"),
            description: String::new(),
            status: None,
            priority: None,
            assigned_to: Some(member),
            tags: Vec::new(),
            start_date: None,
            due_date: None,
        })
        .await
        .expect("member creates task");

    assert_eq!(payload.status, TaskStatus::Todo);
    assert_eq!(payload.priority, TaskPriority::Medium);
    assert_eq!(
        payload.assigned_to.as_ref().map(|user| user.name.as_str()),
        Some("Grace")
    );
}

#[tokio::test]
async fn assignee_must_be_a_collaborator() {
    let creator = UserId::random();
    let outsider = UserId::random();
    let project = sample_project(creator, Vec::new());
    let project_id = *project.id();

    let mut projects = MockProjectRepository::new();
    projects
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(project)));

    let mut tasks = MockTaskRepository::new();
    tasks.expect_insert().times(0);

    let service = service(tasks, projects, MockUserRepository::new());
    let error = service
        .create(CreateTaskRequest {
            actor: creator,
            project: project_id,
            title: TaskTitle::new("Ship it").expect("valid title"),
            description: String::new(),
            status: None,
            priority: None,
            assigned_to: Some(outsider),
            tags: Vec::new(),
            start_date: None,
            due_date: None,
        })
        .await
        .expect_err("outsider cannot be assigned");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn assignee_may_update_status() {
    let creator = UserId::random();
    let assignee = UserId::random();
    let project = sample_project(creator, vec![assignee]);
    let task = sample_task(*project.id(), Some(assignee));
    let task_id = *task.id();

    let mut tasks = MockTaskRepository::new();
    tasks.expect_find_by_id().return_once(move |_| Ok(Some(task)));
    tasks
        .expect_update()
        .withf(|task| task.status() == TaskStatus::InProgress)
        .times(1)
        .return_once(|_| Ok(()));

    let mut projects = MockProjectRepository::new();
    projects
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(project)));

    let service = service(tasks, projects, empty_resolver());
    let payload = service
        .update_status(assignee, task_id, TaskStatus::InProgress)
        .await
        .expect("assignee moves status");

    assert_eq!(payload.status, TaskStatus::InProgress);
}

#[tokio::test]
async fn creator_may_not_update_status_of_assigned_task() {
    let creator = UserId::random();
    let assignee = UserId::random();
    let project = sample_project(creator, vec![assignee]);
    let task = sample_task(*project.id(), Some(assignee));
    let task_id = *task.id();

    let mut tasks = MockTaskRepository::new();
    tasks.expect_find_by_id().return_once(move |_| Ok(Some(task)));
    tasks.expect_update().times(0);

    let mut projects = MockProjectRepository::new();
    projects
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(project)));

    let service = service(tasks, projects, MockUserRepository::new());
    let error = service
        .update_status(creator, task_id, TaskStatus::Done)
        .await
        .expect_err("creator is not the assignee");

    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn unassigned_task_status_is_locked() {
    let creator = UserId::random();
    let project = sample_project(creator, Vec::new());
    let task = sample_task(*project.id(), None);
    let task_id = *task.id();

    let mut tasks = MockTaskRepository::new();
    tasks.expect_find_by_id().return_once(move |_| Ok(Some(task)));

    let mut projects = MockProjectRepository::new();
    projects
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(project)));

    let service = service(tasks, projects, MockUserRepository::new());
    let error = service
        .update_status(creator, task_id, TaskStatus::Done)
        .await
        .expect_err("no assignee, no status channel");

    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn outsider_reads_task_as_missing() {
    let creator = UserId::random();
    let outsider = UserId::random();
    let project = sample_project(creator, Vec::new());
    let task = sample_task(*project.id(), None);
    let task_id = *task.id();

    let mut tasks = MockTaskRepository::new();
    tasks.expect_find_by_id().return_once(move |_| Ok(Some(task)));

    let mut projects = MockProjectRepository::new();
    projects
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(project)));

    let service = service(tasks, projects, MockUserRepository::new());
    let error = service
        .get(outsider, task_id)
        .await
        .expect_err("opaque to outsiders");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn only_the_creator_edits_task_fields() {
    let creator = UserId::random();
    let member = UserId::random();
    let project = sample_project(creator, vec![member]);
    let task = sample_task(*project.id(), Some(member));
    let task_id = *task.id();

    let mut tasks = MockTaskRepository::new();
    tasks.expect_find_by_id().return_once(move |_| Ok(Some(task)));
    tasks.expect_update().times(0);

    let mut projects = MockProjectRepository::new();
    projects
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(project)));

    let service = service(tasks, projects, MockUserRepository::new());
    let error = service
        .update(UpdateTaskRequest {
            actor: member,
            task: task_id,
            patch: TaskPatch {
                priority: Some(TaskPriority::High),
                ..TaskPatch::default()
            },
        })
        .await
        .expect_err("members cannot edit");

    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn update_can_clear_the_assignee() {
    let creator = UserId::random();
    let member = UserId::random();
    let project = sample_project(creator, vec![member]);
    let task = sample_task(*project.id(), Some(member));
    let task_id = *task.id();

    let mut tasks = MockTaskRepository::new();
    tasks.expect_find_by_id().return_once(move |_| Ok(Some(task)));
    tasks
        .expect_update()
        .withf(|task| task.assigned_to().is_none())
        .times(1)
        .return_once(|_| Ok(()));

    let mut projects = MockProjectRepository::new();
    projects
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(project)));

    let service = service(tasks, projects, empty_resolver());
    let payload = service
        .update(UpdateTaskRequest {
            actor: creator,
            task: task_id,
            patch: TaskPatch {
                assigned_to: Some(None),
                ..TaskPatch::default()
            },
        })
        .await
        .expect("creator clears assignee");

    assert!(payload.assigned_to.is_none());
}

#[tokio::test]
async fn comment_text_must_not_be_blank() {
    let creator = UserId::random();
    let project = sample_project(creator, Vec::new());
    let task = sample_task(*project.id(), None);
    let task_id = *task.id();

    let mut tasks = MockTaskRepository::new();
    tasks.expect_find_by_id().return_once(move |_| Ok(Some(task)));
    tasks.expect_append_comment().times(0);

    let mut projects = MockProjectRepository::new();
    projects
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(project)));

    let service = service(tasks, projects, MockUserRepository::new());
    let error = service
        .append_comment(AppendCommentRequest {
            actor: creator,
            task: task_id,
            text: "   ".to_owned(),
            mentions: Vec::new(),
        })
        .await
        .expect_err("blank comment");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn any_collaborator_may_comment() {
    let creator = UserId::random();
    let member = UserId::random();
    let project = sample_project(creator, vec![member]);
    let task = sample_task(*project.id(), None);
    let task_id = *task.id();

    let mut tasks = MockTaskRepository::new();
    tasks.expect_find_by_id().return_once(move |_| Ok(Some(task)));
    tasks
        .expect_append_comment()
        .withf(move |_, comment| comment.author() == &member)
        .times(1)
        .return_once(|_, _| Ok(true));

    let mut projects = MockProjectRepository::new();
    projects
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(project)));

    let mut users = MockUserRepository::new();
    let author = identity(member, "Grace");
    users
        .expect_resolve()
        .return_once(move |_| Ok(HashMap::from([(member, author)])));

    let service = service(tasks, projects, users);
    let payload = service
        .append_comment(AppendCommentRequest {
            actor: member,
            task: task_id,
            text: "on it".to_owned(),
            mentions: vec![creator],
        })
        .await
        .expect("member comments");

    assert_eq!(payload.author.name, "Grace");
    assert_eq!(payload.mentions, vec![creator]);
}

#[tokio::test]
async fn assigned_listing_needs_no_project_check() {
    let actor = UserId::random();
    let task = sample_task(ProjectId::random(), Some(actor));

    let mut tasks = MockTaskRepository::new();
    tasks
        .expect_list_assigned_to()
        .return_once(move |_| Ok(vec![task]));

    let service = service(tasks, MockProjectRepository::new(), empty_resolver());
    let payload = service.list_assigned(actor).await.expect("list succeeds");

    assert_eq!(payload.len(), 1);
}
