//! Invitation state machine.
//!
//! An invite is a pending offer of project membership from a sender to a
//! receiver. It transitions out of `pending` exactly once — to `accepted` or
//! `rejected` — and is never deleted, serving as an audit trail.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ids::{InviteId, ProjectId, UserId};

/// Invite lifecycle status. `Accepted` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum InviteStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

impl InviteStatus {
    /// Stable wire name for the status.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

impl std::str::FromStr for InviteStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            other => Err(format!("unknown invite status: {other}")),
        }
    }
}

impl fmt::Display for InviteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The receiver's response to a pending invite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum InviteAction {
    Accept,
    Reject,
}

impl InviteAction {
    /// The terminal status this action transitions the invite into.
    #[must_use]
    pub fn resulting_status(self) -> InviteStatus {
        match self {
            Self::Accept => InviteStatus::Accepted,
            Self::Reject => InviteStatus::Rejected,
        }
    }
}

impl std::str::FromStr for InviteAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accept" => Ok(Self::Accept),
            "reject" => Ok(Self::Reject),
            other => Err(format!("unknown invite action: {other}")),
        }
    }
}

/// Error raised when responding to an invite that is no longer pending.
/// Repeated responses must surface as a conflict, never silently succeed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invite already {status}")]
pub struct InviteAlreadyResponded {
    status: InviteStatus,
}

impl InviteAlreadyResponded {
    /// Terminal status the invite already holds.
    #[must_use]
    pub fn status(&self) -> InviteStatus {
        self.status
    }
}

/// A membership offer for a specific project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invite {
    id: InviteId,
    sender: UserId,
    receiver: UserId,
    project: ProjectId,
    status: InviteStatus,
    created_at: DateTime<Utc>,
}

impl Invite {
    /// Create a new invite in the `pending` state.
    #[must_use]
    pub fn new(
        id: InviteId,
        sender: UserId,
        receiver: UserId,
        project: ProjectId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            sender,
            receiver,
            project,
            status: InviteStatus::Pending,
            created_at,
        }
    }

    /// Rehydrate an invite from storage, status included.
    #[must_use]
    pub fn from_parts(
        id: InviteId,
        sender: UserId,
        receiver: UserId,
        project: ProjectId,
        status: InviteStatus,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            sender,
            receiver,
            project,
            status,
            created_at,
        }
    }

    /// Stable identifier.
    pub fn id(&self) -> &InviteId {
        &self.id
    }

    /// The inviting user.
    pub fn sender(&self) -> &UserId {
        &self.sender
    }

    /// The invited user; the only actor allowed to respond.
    pub fn receiver(&self) -> &UserId {
        &self.receiver
    }

    /// The project membership is offered for.
    pub fn project(&self) -> &ProjectId {
        &self.project
    }

    /// Current lifecycle status.
    pub fn status(&self) -> InviteStatus {
        self.status
    }

    /// Creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Whether this invite still awaits a response.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == InviteStatus::Pending
    }

    /// Apply the receiver's response, transitioning `pending` into a terminal
    /// status. A second response fails; terminal states never change.
    pub fn respond(&mut self, action: InviteAction) -> Result<(), InviteAlreadyResponded> {
        if !self.is_pending() {
            return Err(InviteAlreadyResponded {
                status: self.status,
            });
        }
        self.status = action.resulting_status();
        Ok(())
    }
}
