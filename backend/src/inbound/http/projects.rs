//! Project API handlers.
//!
//! All routes require an authenticated session. Reads and writes alike are
//! scoped to the acting user; a project the actor does not collaborate on is
//! indistinguishable from one that does not exist.

use actix_web::{HttpResponse, delete, get, patch, post, web};
use chrono::Utc;
use serde::Deserialize;

use crate::domain::ports::{
    CreateProjectRequest, ProjectDeletedPayload, ProjectPayload, UpdateProjectRequest,
};
use crate::domain::{
    Error, ProjectDescription, ProjectId, ProjectPatch, ProjectStatus, ProjectTitle, RoadmapEntry,
    UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_field_error, parse_id, parse_id_list, parse_optional_enum,
    parse_optional_rfc3339_timestamp, parse_rfc3339_timestamp,
};

/// One roadmap milestone in a request body.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapEntryBody {
    pub milestone: String,
    pub due_date: String,
}

/// Project creation request body.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectBody {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub roadmap: Option<Vec<RoadmapEntryBody>>,
    #[serde(default)]
    pub members: Option<Vec<String>>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub target_date: Option<String>,
}

/// Partial project update request body; absent fields keep current values.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectBody {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub roadmap: Option<Vec<RoadmapEntryBody>>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub target_date: Option<String>,
}

fn parse_title(raw: &str) -> Result<ProjectTitle, Error> {
    ProjectTitle::new(raw).map_err(|err| invalid_field_error(FieldName::new("title"), err))
}

fn parse_description(raw: Option<String>) -> Result<ProjectDescription, Error> {
    match raw {
        Some(raw) => ProjectDescription::new(raw)
            .map_err(|err| invalid_field_error(FieldName::new("description"), err)),
        None => Ok(ProjectDescription::default()),
    }
}

fn parse_roadmap(entries: Vec<RoadmapEntryBody>) -> Result<Vec<RoadmapEntry>, Error> {
    let now = Utc::now();
    entries
        .into_iter()
        .map(|entry| {
            let due_date =
                parse_rfc3339_timestamp(&entry.due_date, FieldName::new("roadmap.dueDate"))?;
            RoadmapEntry::new(entry.milestone, due_date, now)
                .map_err(|err| invalid_field_error(FieldName::new("roadmap"), err))
        })
        .collect()
}

pub(crate) fn parse_project_id(raw: &str) -> Result<ProjectId, Error> {
    parse_id(raw, FieldName::new("projectId"), ProjectId::new)
}

/// Create a project with the acting user as creator.
#[utoipa::path(
    post,
    path = "/api/v1/projects",
    request_body = CreateProjectBody,
    responses(
        (status = 201, description = "Project created", body = ProjectPayload),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["projects"],
    operation_id = "createProject"
)]
#[post("/projects")]
pub async fn create_project(
    session: SessionContext,
    state: web::Data<HttpState>,
    payload: web::Json<CreateProjectBody>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let body = payload.into_inner();

    let request = CreateProjectRequest {
        actor,
        title: parse_title(&body.title)?,
        description: parse_description(body.description)?,
        status: parse_optional_enum::<ProjectStatus>(body.status, FieldName::new("status"))?,
        tags: body.tags.unwrap_or_default(),
        roadmap: parse_roadmap(body.roadmap.unwrap_or_default())?,
        members: parse_id_list(
            body.members.unwrap_or_default(),
            FieldName::new("members"),
            UserId::new,
        )?,
        start_date: parse_optional_rfc3339_timestamp(
            body.start_date,
            FieldName::new("startDate"),
        )?,
        target_date: parse_optional_rfc3339_timestamp(
            body.target_date,
            FieldName::new("targetDate"),
        )?,
    };

    let project = state.projects.create(request).await?;
    Ok(HttpResponse::Created().json(project))
}

/// List projects the acting user collaborates on, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/projects",
    responses(
        (status = 200, description = "Projects", body = [ProjectPayload]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["projects"],
    operation_id = "listProjects"
)]
#[get("/projects")]
pub async fn list_projects(
    session: SessionContext,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<ProjectPayload>>> {
    let actor = session.require_user_id()?;
    let projects = state.projects.list_mine(actor).await?;
    Ok(web::Json(projects))
}

/// Fetch a single project the acting user collaborates on.
#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}",
    params(("id" = String, Path, description = "Project id")),
    responses(
        (status = 200, description = "Project", body = ProjectPayload),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["projects"],
    operation_id = "getProject"
)]
#[get("/projects/{id}")]
pub async fn get_project(
    session: SessionContext,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<ProjectPayload>> {
    let actor = session.require_user_id()?;
    let id = parse_project_id(&path.into_inner())?;
    let project = state.projects.get(actor, id).await?;
    Ok(web::Json(project))
}

/// Partially update a project; creator only.
#[utoipa::path(
    patch,
    path = "/api/v1/projects/{id}",
    params(("id" = String, Path, description = "Project id")),
    request_body = UpdateProjectBody,
    responses(
        (status = 200, description = "Updated project", body = ProjectPayload),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["projects"],
    operation_id = "updateProject"
)]
#[patch("/projects/{id}")]
pub async fn update_project(
    session: SessionContext,
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<UpdateProjectBody>,
) -> ApiResult<web::Json<ProjectPayload>> {
    let actor = session.require_user_id()?;
    let id = parse_project_id(&path.into_inner())?;
    let body = payload.into_inner();

    let patch = ProjectPatch {
        title: body.title.as_deref().map(parse_title).transpose()?,
        description: body
            .description
            .map(|raw| parse_description(Some(raw)))
            .transpose()?,
        status: parse_optional_enum::<ProjectStatus>(body.status, FieldName::new("status"))?,
        tags: body.tags,
        roadmap: body.roadmap.map(parse_roadmap).transpose()?,
        start_date: parse_optional_rfc3339_timestamp(
            body.start_date,
            FieldName::new("startDate"),
        )?,
        target_date: parse_optional_rfc3339_timestamp(
            body.target_date,
            FieldName::new("targetDate"),
        )?,
    };

    let project = state
        .projects
        .update(UpdateProjectRequest {
            actor,
            project: id,
            patch,
        })
        .await?;
    Ok(web::Json(project))
}

/// Delete a project and its tasks; creator only.
#[utoipa::path(
    delete,
    path = "/api/v1/projects/{id}",
    params(("id" = String, Path, description = "Project id")),
    responses(
        (status = 200, description = "Project deleted", body = ProjectDeletedPayload),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["projects"],
    operation_id = "deleteProject"
)]
#[delete("/projects/{id}")]
pub async fn delete_project(
    session: SessionContext,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<ProjectDeletedPayload>> {
    let actor = session.require_user_id()?;
    let id = parse_project_id(&path.into_inner())?;
    let outcome = state.projects.delete(actor, id).await?;
    Ok(web::Json(outcome))
}
