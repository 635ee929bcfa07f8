//! Invitation API handlers.

use actix_web::{HttpResponse, get, post, web};
use serde::Deserialize;

use crate::domain::ports::{
    InviteListPayload, InvitePayload, RespondToInviteRequest, SendInviteRequest,
};
use crate::domain::{EmailAddress, Error, InviteAction, InviteId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::projects::parse_project_id;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, invalid_field_error, parse_enum, parse_id};

/// Invite request body; the receiver is addressed by email.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendInviteBody {
    pub email: String,
}

/// Invite response body: `accept` or `reject`.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RespondBody {
    pub action: String,
}

/// Invite a user to a project by email.
#[utoipa::path(
    post,
    path = "/api/v1/projects/{id}/invites",
    params(("id" = String, Path, description = "Project id")),
    request_body = SendInviteBody,
    responses(
        (status = 201, description = "Invite sent", body = InvitePayload),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Already invited or already a member", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["invites"],
    operation_id = "sendInvite"
)]
#[post("/projects/{id}/invites")]
pub async fn send_invite(
    session: SessionContext,
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<SendInviteBody>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let project = parse_project_id(&path.into_inner())?;
    let receiver_email = EmailAddress::new(&payload.email)
        .map_err(|err| invalid_field_error(FieldName::new("email"), err))?;

    let invite = state
        .invites
        .send(SendInviteRequest {
            actor,
            project,
            receiver_email,
        })
        .await?;
    Ok(HttpResponse::Created().json(invite))
}

/// The acting user's invite inbox, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/invites",
    responses(
        (status = 200, description = "Invites", body = [InviteListPayload]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["invites"],
    operation_id = "listInvites"
)]
#[get("/invites")]
pub async fn list_invites(
    session: SessionContext,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<InviteListPayload>>> {
    let actor = session.require_user_id()?;
    let invites = state.invites.list_for_me(actor).await?;
    Ok(web::Json(invites))
}

/// Accept or reject a pending invite; receiver only, exactly once.
#[utoipa::path(
    post,
    path = "/api/v1/invites/{id}/respond",
    params(("id" = String, Path, description = "Invite id")),
    request_body = RespondBody,
    responses(
        (status = 200, description = "Invite resolved", body = InvitePayload),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Already responded", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["invites"],
    operation_id = "respondToInvite"
)]
#[post("/invites/{id}/respond")]
pub async fn respond_invite(
    session: SessionContext,
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<RespondBody>,
) -> ApiResult<web::Json<InvitePayload>> {
    let actor = session.require_user_id()?;
    let invite = parse_id(&path.into_inner(), FieldName::new("inviteId"), InviteId::new)?;
    let action = parse_enum::<InviteAction>(&payload.action, FieldName::new("action"))?;

    let resolved = state
        .invites
        .respond(RespondToInviteRequest {
            actor,
            invite,
            action,
        })
        .await?;
    Ok(web::Json(resolved))
}
