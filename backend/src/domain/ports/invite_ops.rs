//! Driving port for the invitation workflow.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::error::Error;
use crate::domain::ids::{InviteId, ProjectId, UserId};
use crate::domain::invite::{Invite, InviteAction, InviteStatus};
use crate::domain::ports::project_ops::UserRefPayload;
use crate::domain::user::EmailAddress;

/// Boundary-validated request to invite a user by email.
#[derive(Debug, Clone)]
pub struct SendInviteRequest {
    pub actor: UserId,
    pub project: ProjectId,
    pub receiver_email: EmailAddress,
}

#[derive(Debug, Clone)]
pub struct RespondToInviteRequest {
    pub actor: UserId,
    pub invite: InviteId,
    pub action: InviteAction,
}

/// Bare invite projection returned from writes.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvitePayload {
    pub id: InviteId,
    pub sender: UserId,
    pub receiver: UserId,
    pub project: ProjectId,
    pub status: InviteStatus,
    pub created_at: DateTime<Utc>,
}

impl From<&Invite> for InvitePayload {
    fn from(invite: &Invite) -> Self {
        Self {
            id: *invite.id(),
            sender: *invite.sender(),
            receiver: *invite.receiver(),
            project: *invite.project(),
            status: invite.status(),
            created_at: invite.created_at(),
        }
    }
}

/// Inbox projection with the sender and project resolved for display.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InviteListPayload {
    pub id: InviteId,
    pub status: InviteStatus,
    pub sender: UserRefPayload,
    pub project: ProjectId,
    pub project_title: String,
    pub created_at: DateTime<Utc>,
}

/// Domain use-case port for sending and answering invitations.
#[async_trait]
pub trait InviteOps: Send + Sync {
    async fn send(&self, request: SendInviteRequest) -> Result<InvitePayload, Error>;

    /// The actor's inbox, newest first.
    async fn list_for_me(&self, actor: UserId) -> Result<Vec<InviteListPayload>, Error>;

    /// Accept or reject a pending invitation, exactly once.
    async fn respond(&self, request: RespondToInviteRequest) -> Result<InvitePayload, Error>;
}
