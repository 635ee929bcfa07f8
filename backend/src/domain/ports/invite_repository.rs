//! Port for invite persistence.
//!
//! The one deliberately non-generic operation is [`InviteRepository::
//! mark_responded`]: a compare-and-set that only flips an invite out of
//! `pending`. Two racing accepts both reach the store, but exactly one
//! matches the guard; the loser observes `false` and surfaces a conflict.

use async_trait::async_trait;

use crate::domain::ids::{InviteId, ProjectId, UserId};
use crate::domain::invite::{Invite, InviteStatus};

use super::define_port_error;

define_port_error! {
    /// Errors raised by invite repository adapters.
    pub enum InvitePersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "invite repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "invite repository query failed: {message}",
    }
}

/// Port for writing and reading invites. Invites are never deleted; the
/// record is an audit trail.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InviteRepository: Send + Sync {
    /// Persist a new invite.
    async fn insert(&self, invite: &Invite) -> Result<(), InvitePersistenceError>;

    /// Find an invite by id.
    async fn find_by_id(&self, id: &InviteId)
        -> Result<Option<Invite>, InvitePersistenceError>;

    /// Find the pending invite for a (receiver, project) pair, if any.
    /// At most one may exist at a time.
    async fn find_pending(
        &self,
        receiver: &UserId,
        project: &ProjectId,
    ) -> Result<Option<Invite>, InvitePersistenceError>;

    /// List all invites addressed to `receiver`, newest first.
    async fn list_for_receiver(
        &self,
        receiver: &UserId,
    ) -> Result<Vec<Invite>, InvitePersistenceError>;

    /// Compare-and-set the invite from `pending` into `status`. Returns
    /// whether the guard matched; `false` means the invite was already
    /// responded to (possibly by a racing request).
    async fn mark_responded(
        &self,
        id: &InviteId,
        status: InviteStatus,
    ) -> Result<bool, InvitePersistenceError>;
}
