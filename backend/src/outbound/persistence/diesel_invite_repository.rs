//! Diesel-backed invite repository.
//!
//! `mark_responded` is the compare-and-set the invite state machine relies
//! on: the UPDATE is guarded on `status = 'pending'`, so racing responses
//! resolve in the database and the loser sees zero affected rows.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ids::{InviteId, ProjectId, UserId};
use crate::domain::invite::{Invite, InviteStatus};
use crate::domain::ports::{InvitePersistenceError, InviteRepository};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{InviteRow, NewInviteRow};
use super::pool::{DbPool, PoolError};
use super::schema::invites;

/// PostgreSQL implementation of [`InviteRepository`].
#[derive(Clone)]
pub struct DieselInviteRepository {
    pool: DbPool,
}

impl DieselInviteRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> InvitePersistenceError {
    map_pool_error(error, InvitePersistenceError::connection)
}

fn diesel_error(error: diesel::result::Error) -> InvitePersistenceError {
    map_diesel_error(
        error,
        InvitePersistenceError::query,
        InvitePersistenceError::connection,
    )
}

fn row_to_invite(row: InviteRow) -> Result<Invite, InvitePersistenceError> {
    let InviteRow {
        id,
        sender,
        receiver,
        project,
        status,
        created_at,
    } = row;

    let status: InviteStatus = status.parse().map_err(|err| {
        InvitePersistenceError::query(format!("stored invite status invalid: {err}"))
    })?;

    Ok(Invite::from_parts(
        InviteId::from_uuid(id),
        UserId::from_uuid(sender),
        UserId::from_uuid(receiver),
        ProjectId::from_uuid(project),
        status,
        created_at,
    ))
}

#[async_trait]
impl InviteRepository for DieselInviteRepository {
    async fn insert(&self, invite: &Invite) -> Result<(), InvitePersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let row = NewInviteRow {
            id: *invite.id().as_uuid(),
            sender: *invite.sender().as_uuid(),
            receiver: *invite.receiver().as_uuid(),
            project: *invite.project().as_uuid(),
            status: invite.status().as_str(),
            created_at: invite.created_at(),
        };

        diesel::insert_into(invites::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(())
    }

    async fn find_by_id(&self, id: &InviteId) -> Result<Option<Invite>, InvitePersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let row = invites::table
            .find(id.as_uuid())
            .select(InviteRow::as_select())
            .first::<InviteRow>(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;

        row.map(row_to_invite).transpose()
    }

    async fn find_pending(
        &self,
        receiver: &UserId,
        project: &ProjectId,
    ) -> Result<Option<Invite>, InvitePersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let row = invites::table
            .filter(invites::receiver.eq(receiver.as_uuid()))
            .filter(invites::project.eq(project.as_uuid()))
            .filter(invites::status.eq(InviteStatus::Pending.as_str()))
            .select(InviteRow::as_select())
            .first::<InviteRow>(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;

        row.map(row_to_invite).transpose()
    }

    async fn list_for_receiver(
        &self,
        receiver: &UserId,
    ) -> Result<Vec<Invite>, InvitePersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let rows = invites::table
            .filter(invites::receiver.eq(receiver.as_uuid()))
            .order(invites::created_at.desc())
            .select(InviteRow::as_select())
            .load::<InviteRow>(&mut conn)
            .await
            .map_err(diesel_error)?;

        rows.into_iter().map(row_to_invite).collect()
    }

    async fn mark_responded(
        &self,
        id: &InviteId,
        status: InviteStatus,
    ) -> Result<bool, InvitePersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let affected = diesel::update(
            invites::table
                .find(id.as_uuid())
                .filter(invites::status.eq(InviteStatus::Pending.as_str())),
        )
        .set(invites::status.eq(status.as_str()))
        .execute(&mut conn)
        .await
        .map_err(diesel_error)?;

        Ok(affected > 0)
    }
}
