//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] aggregates every HTTP endpoint and the schemas their payloads
//! reference. The generated specification backs Swagger UI in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::ids::{InviteId, ProjectId, TaskId, UserId};
use crate::domain::invite::{InviteAction, InviteStatus};
use crate::domain::project::ProjectStatus;
use crate::domain::task::{TaskPriority, TaskStatus};
use crate::domain::user::AuthProvider;
use crate::domain::{Error, ErrorCode};
use crate::domain::ports::{
    CommentPayload, InviteListPayload, InvitePayload, ProjectDeletedPayload, ProjectPayload,
    RoadmapEntryPayload, TaskDetailPayload, TaskPayload, UserProfilePayload, UserRefPayload,
};
use crate::inbound::http::auth::{LoginBody, RegisterBody, TokenBody};
use crate::inbound::http::invites::{RespondBody, SendInviteBody};
use crate::inbound::http::projects::{CreateProjectBody, RoadmapEntryBody, UpdateProjectBody};
use crate::inbound::http::tasks::{CommentBody, CreateTaskBody, TaskStatusBody, UpdateTaskBody};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/auth/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Collaboration backend API",
        description = "HTTP interface for projects, tasks, invitations, and \
                       session-authenticated identity."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::register,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::token,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::me,
        crate::inbound::http::projects::create_project,
        crate::inbound::http::projects::list_projects,
        crate::inbound::http::projects::get_project,
        crate::inbound::http::projects::update_project,
        crate::inbound::http::projects::delete_project,
        crate::inbound::http::tasks::create_task,
        crate::inbound::http::tasks::list_project_tasks,
        crate::inbound::http::tasks::assigned_tasks,
        crate::inbound::http::tasks::get_task,
        crate::inbound::http::tasks::update_task,
        crate::inbound::http::tasks::update_task_status,
        crate::inbound::http::tasks::delete_task,
        crate::inbound::http::tasks::add_comment,
        crate::inbound::http::invites::send_invite,
        crate::inbound::http::invites::list_invites,
        crate::inbound::http::invites::respond_invite,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        UserId,
        ProjectId,
        InviteId,
        TaskId,
        Error,
        ErrorCode,
        AuthProvider,
        ProjectStatus,
        TaskStatus,
        TaskPriority,
        InviteStatus,
        InviteAction,
        UserProfilePayload,
        UserRefPayload,
        RoadmapEntryPayload,
        ProjectPayload,
        ProjectDeletedPayload,
        TaskPayload,
        CommentPayload,
        TaskDetailPayload,
        InvitePayload,
        InviteListPayload,
        RegisterBody,
        LoginBody,
        TokenBody,
        CreateProjectBody,
        UpdateProjectBody,
        RoadmapEntryBody,
        CreateTaskBody,
        UpdateTaskBody,
        TaskStatusBody,
        CommentBody,
        SendInviteBody,
        RespondBody,
    )),
    tags(
        (name = "auth", description = "Registration, login, and session identity"),
        (name = "projects", description = "Project aggregates and membership"),
        (name = "tasks", description = "Tasks and their comment logs"),
        (name = "invites", description = "Membership invitations"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
