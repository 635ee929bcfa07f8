//! Invitation workflow domain service.
//!
//! Accepting is a two-step write: the membership effect lands first, then a
//! compare-and-set flips the invite out of `pending`. Racing accepts both
//! perform the idempotent membership add, but only one wins the CAS; the
//! loser reports a conflict and the project never gains a duplicate member.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::access::{CollaborationPolicy, DenyReason, ProjectAction, authorize_project};
use crate::domain::error::Error;
use crate::domain::ids::{InviteId, ProjectId, UserId};
use crate::domain::invite::{Invite, InviteAction};
use crate::domain::ports::{
    InviteListPayload, InviteOps, InvitePayload, InviteRepository, ProjectRepository,
    RespondToInviteRequest, SendInviteRequest, UserRepository, UserRefPayload,
};

fn deny(reason: DenyReason) -> Error {
    match reason {
        DenyReason::NotCollaborator => Error::not_found("project not found"),
        reason => Error::forbidden(reason.to_string()),
    }
}

/// Invite service over the invite, project and user stores.
#[derive(Clone)]
pub struct InviteService<I, P, U> {
    invites: Arc<I>,
    projects: Arc<P>,
    users: Arc<U>,
    policy: CollaborationPolicy,
}

impl<I, P, U> InviteService<I, P, U> {
    /// Create the service with its collaborators and access policy.
    pub fn new(invites: Arc<I>, projects: Arc<P>, users: Arc<U>, policy: CollaborationPolicy) -> Self {
        Self {
            invites,
            projects,
            users,
            policy,
        }
    }
}

#[async_trait]
impl<I, P, U> InviteOps for InviteService<I, P, U>
where
    I: InviteRepository,
    P: ProjectRepository,
    U: UserRepository,
{
    async fn send(&self, request: SendInviteRequest) -> Result<InvitePayload, Error> {
        let project = self
            .projects
            .find_by_id(&request.project)
            .await?
            .ok_or_else(|| Error::not_found("project not found"))?;
        authorize_project(self.policy, &request.actor, &project, ProjectAction::Invite)
            .map_err(deny)?;

        let receiver = self
            .users
            .find_by_email(&request.receiver_email)
            .await?
            .ok_or_else(|| Error::not_found("no user with that email address"))?;
        if project.is_collaborator(receiver.id()) {
            return Err(Error::conflict("user is already a collaborator"));
        }
        if self
            .invites
            .find_pending(receiver.id(), project.id())
            .await?
            .is_some()
        {
            return Err(Error::conflict("an invitation is already pending"));
        }

        let invite = Invite::new(
            InviteId::random(),
            request.actor,
            *receiver.id(),
            *project.id(),
            Utc::now(),
        );
        self.invites.insert(&invite).await?;
        tracing::info!(invite_id = %invite.id(), project_id = %project.id(), "sent invite");
        Ok(InvitePayload::from(&invite))
    }

    async fn list_for_me(&self, actor: UserId) -> Result<Vec<InviteListPayload>, Error> {
        let invites = self.invites.list_for_receiver(&actor).await?;

        let mut senders: Vec<UserId> = Vec::new();
        let mut referenced: Vec<ProjectId> = Vec::new();
        for invite in &invites {
            if !senders.contains(invite.sender()) {
                senders.push(*invite.sender());
            }
            if !referenced.contains(invite.project()) {
                referenced.push(*invite.project());
            }
        }
        let identities = self.users.resolve(&senders).await?;
        let projects = self.projects.find_by_ids(&referenced).await?;

        let mut payloads = Vec::with_capacity(invites.len());
        for invite in &invites {
            // An invite outlives its project; once the project is gone there
            // is nothing left to join, so the entry drops out of the inbox.
            let Some(project) = projects.get(invite.project()) else {
                continue;
            };
            let sender = identities
                .get(invite.sender())
                .map_or_else(|| UserRefPayload::unresolved(*invite.sender()), UserRefPayload::from);
            payloads.push(InviteListPayload {
                id: *invite.id(),
                status: invite.status(),
                sender,
                project: *invite.project(),
                project_title: project.title().as_ref().to_owned(),
                created_at: invite.created_at(),
            });
        }
        Ok(payloads)
    }

    async fn respond(&self, request: RespondToInviteRequest) -> Result<InvitePayload, Error> {
        let mut invite = self
            .invites
            .find_by_id(&request.invite)
            .await?
            .ok_or_else(|| Error::not_found("invite not found"))?;
        if invite.receiver() != &request.actor {
            return Err(Error::forbidden("only the invited user may respond"));
        }
        if !invite.is_pending() {
            return Err(Error::conflict("invitation was already responded to"));
        }

        if request.action == InviteAction::Accept {
            self.projects
                .find_by_id(invite.project())
                .await?
                .ok_or_else(|| Error::not_found("project no longer exists"))?;
            // Membership first. The add is an idempotent set-add, so when
            // the CAS below loses a race this write changed nothing beyond
            // what the winner already did.
            self.projects
                .add_member(invite.project(), invite.receiver())
                .await?;
        }

        let status = request.action.resulting_status();
        if !self.invites.mark_responded(invite.id(), status).await? {
            return Err(Error::conflict("invitation was already responded to"));
        }
        invite
            .respond(request.action)
            .map_err(|err| Error::internal(err.to_string()))?;
        tracing::info!(invite_id = %invite.id(), status = status.as_str(), "invite responded");
        Ok(InvitePayload::from(&invite))
    }
}

#[cfg(test)]
#[path = "invite_service_tests.rs"]
mod tests;
