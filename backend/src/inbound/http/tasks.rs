//! Task API handlers.
//!
//! Full-field edits go through `PATCH /tasks/{id}` and belong to the project
//! creator. Status changes travel their own route, `PUT /tasks/{id}/status`,
//! which only the assignee may call.

use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use serde::Deserialize;

use crate::domain::ports::{
    AppendCommentRequest, CommentPayload, CreateTaskRequest, TaskDetailPayload, TaskPayload,
    UpdateTaskRequest,
};
use crate::domain::{
    Error, TaskId, TaskPatch, TaskPriority, TaskStatus, TaskTitle, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::projects::parse_project_id;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, double_option, invalid_field_error, parse_enum, parse_id, parse_id_list,
    parse_optional_enum, parse_optional_rfc3339_timestamp,
};

/// Task creation request body.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskBody {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
}

/// Task edit request body; absent fields keep current values. An explicit
/// `"assignedTo": null` clears the assignee. Status is not editable here;
/// it moves only through the assignee's `PUT /tasks/{id}/status` channel.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskBody {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, nullable)]
    pub assigned_to: Option<Option<String>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
}

/// Status change request body.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusBody {
    pub status: String,
}

/// Comment request body.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentBody {
    pub text: String,
    #[serde(default)]
    pub mentions: Option<Vec<String>>,
}

fn parse_task_id(raw: &str) -> Result<TaskId, Error> {
    parse_id(raw, FieldName::new("taskId"), TaskId::new)
}

fn parse_task_title(raw: &str) -> Result<TaskTitle, Error> {
    TaskTitle::new(raw).map_err(|err| invalid_field_error(FieldName::new("title"), err))
}

fn parse_assignee(raw: &str) -> Result<UserId, Error> {
    parse_id(raw, FieldName::new("assignedTo"), UserId::new)
}

/// Create a task under a project; any collaborator may do so.
#[utoipa::path(
    post,
    path = "/api/v1/projects/{id}/tasks",
    params(("id" = String, Path, description = "Project id")),
    request_body = CreateTaskBody,
    responses(
        (status = 201, description = "Task created", body = TaskPayload),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["tasks"],
    operation_id = "createTask"
)]
#[post("/projects/{id}/tasks")]
pub async fn create_task(
    session: SessionContext,
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<CreateTaskBody>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let project = parse_project_id(&path.into_inner())?;
    let body = payload.into_inner();

    let request = CreateTaskRequest {
        actor,
        project,
        title: parse_task_title(&body.title)?,
        description: body.description.unwrap_or_default(),
        status: parse_optional_enum::<TaskStatus>(body.status, FieldName::new("status"))?,
        priority: parse_optional_enum::<TaskPriority>(body.priority, FieldName::new("priority"))?,
        assigned_to: body.assigned_to.as_deref().map(parse_assignee).transpose()?,
        tags: body.tags.unwrap_or_default(),
        start_date: parse_optional_rfc3339_timestamp(
            body.start_date,
            FieldName::new("startDate"),
        )?,
        due_date: parse_optional_rfc3339_timestamp(body.due_date, FieldName::new("dueDate"))?,
    };

    let task = state.tasks.create(request).await?;
    Ok(HttpResponse::Created().json(task))
}

/// List a project's tasks, oldest first.
#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}/tasks",
    params(("id" = String, Path, description = "Project id")),
    responses(
        (status = 200, description = "Tasks", body = [TaskPayload]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["tasks"],
    operation_id = "listProjectTasks"
)]
#[get("/projects/{id}/tasks")]
pub async fn list_project_tasks(
    session: SessionContext,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<TaskPayload>>> {
    let actor = session.require_user_id()?;
    let project = parse_project_id(&path.into_inner())?;
    let tasks = state.tasks.list_for_project(actor, project).await?;
    Ok(web::Json(tasks))
}

/// Tasks assigned to the acting user across projects, nearest due date first.
#[utoipa::path(
    get,
    path = "/api/v1/tasks/assigned",
    responses(
        (status = 200, description = "Assigned tasks", body = [TaskPayload]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["tasks"],
    operation_id = "listAssignedTasks"
)]
#[get("/tasks/assigned")]
pub async fn assigned_tasks(
    session: SessionContext,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<TaskPayload>>> {
    let actor = session.require_user_id()?;
    let tasks = state.tasks.list_assigned(actor).await?;
    Ok(web::Json(tasks))
}

/// Fetch a task with its full comment thread.
#[utoipa::path(
    get,
    path = "/api/v1/tasks/{id}",
    params(("id" = String, Path, description = "Task id")),
    responses(
        (status = 200, description = "Task detail", body = TaskDetailPayload),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["tasks"],
    operation_id = "getTask"
)]
#[get("/tasks/{id}")]
pub async fn get_task(
    session: SessionContext,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<TaskDetailPayload>> {
    let actor = session.require_user_id()?;
    let id = parse_task_id(&path.into_inner())?;
    let task = state.tasks.get(actor, id).await?;
    Ok(web::Json(task))
}

/// Edit a task's definition; project creator only.
#[utoipa::path(
    patch,
    path = "/api/v1/tasks/{id}",
    params(("id" = String, Path, description = "Task id")),
    request_body = UpdateTaskBody,
    responses(
        (status = 200, description = "Updated task", body = TaskPayload),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["tasks"],
    operation_id = "updateTask"
)]
#[patch("/tasks/{id}")]
pub async fn update_task(
    session: SessionContext,
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<UpdateTaskBody>,
) -> ApiResult<web::Json<TaskPayload>> {
    let actor = session.require_user_id()?;
    let id = parse_task_id(&path.into_inner())?;
    let body = payload.into_inner();

    let assigned_to = match body.assigned_to {
        None => None,
        Some(None) => Some(None),
        Some(Some(raw)) => Some(Some(parse_assignee(&raw)?)),
    };
    let patch = TaskPatch {
        title: body.title.as_deref().map(parse_task_title).transpose()?,
        description: body.description,
        assigned_to,
        priority: parse_optional_enum::<TaskPriority>(body.priority, FieldName::new("priority"))?,
        tags: body.tags,
        start_date: parse_optional_rfc3339_timestamp(
            body.start_date,
            FieldName::new("startDate"),
        )?,
        due_date: parse_optional_rfc3339_timestamp(body.due_date, FieldName::new("dueDate"))?,
    };

    let task = state
        .tasks
        .update(UpdateTaskRequest {
            actor,
            task: id,
            patch,
        })
        .await?;
    Ok(web::Json(task))
}

/// Move a task between states; assignee only.
#[utoipa::path(
    put,
    path = "/api/v1/tasks/{id}/status",
    params(("id" = String, Path, description = "Task id")),
    request_body = TaskStatusBody,
    responses(
        (status = 200, description = "Updated task", body = TaskPayload),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["tasks"],
    operation_id = "updateTaskStatus"
)]
#[put("/tasks/{id}/status")]
pub async fn update_task_status(
    session: SessionContext,
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<TaskStatusBody>,
) -> ApiResult<web::Json<TaskPayload>> {
    let actor = session.require_user_id()?;
    let id = parse_task_id(&path.into_inner())?;
    let status = parse_enum::<TaskStatus>(&payload.status, FieldName::new("status"))?;
    let task = state.tasks.update_status(actor, id, status).await?;
    Ok(web::Json(task))
}

/// Delete a task; project creator only.
#[utoipa::path(
    delete,
    path = "/api/v1/tasks/{id}",
    params(("id" = String, Path, description = "Task id")),
    responses(
        (status = 204, description = "Task deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["tasks"],
    operation_id = "deleteTask"
)]
#[delete("/tasks/{id}")]
pub async fn delete_task(
    session: SessionContext,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let id = parse_task_id(&path.into_inner())?;
    state.tasks.delete(actor, id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Append a comment to a task; any collaborator may do so.
#[utoipa::path(
    post,
    path = "/api/v1/tasks/{id}/comments",
    params(("id" = String, Path, description = "Task id")),
    request_body = CommentBody,
    responses(
        (status = 201, description = "Comment appended", body = CommentPayload),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["tasks"],
    operation_id = "addComment"
)]
#[post("/tasks/{id}/comments")]
pub async fn add_comment(
    session: SessionContext,
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<CommentBody>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let id = parse_task_id(&path.into_inner())?;
    let body = payload.into_inner();

    let comment = state
        .tasks
        .append_comment(AppendCommentRequest {
            actor,
            task: id,
            text: body.text,
            mentions: parse_id_list(
                body.mentions.unwrap_or_default(),
                FieldName::new("mentions"),
                UserId::new,
            )?,
        })
        .await?;
    Ok(HttpResponse::Created().json(comment))
}
