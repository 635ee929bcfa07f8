//! Diesel-backed user repository.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ids::UserId;
use crate::domain::ports::{CredentialRecord, UserPersistenceError, UserRepository};
use crate::domain::user::{AuthProvider, EmailAddress, User, UserName};

use super::diesel_error_mapping::{is_unique_violation, map_diesel_error, map_pool_error};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// PostgreSQL implementation of [`UserRepository`].
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> UserPersistenceError {
    map_pool_error(error, UserPersistenceError::connection)
}

fn diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    map_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

/// Rebuild the domain user from a row, keeping the credential hash separate.
fn row_to_user(row: UserRow) -> Result<(User, Option<String>), UserPersistenceError> {
    let UserRow {
        id,
        name,
        email,
        password_hash,
        provider,
        created_at,
    } = row;

    let name = UserName::new(&name)
        .map_err(|err| UserPersistenceError::query(format!("stored user name invalid: {err}")))?;
    let email = EmailAddress::new(&email)
        .map_err(|err| UserPersistenceError::query(format!("stored email invalid: {err}")))?;
    let provider: AuthProvider = provider
        .parse()
        .map_err(|err| UserPersistenceError::query(format!("stored provider invalid: {err}")))?;

    let user = User::new(UserId::from_uuid(id), name, email, provider, created_at);
    Ok((user, password_hash))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert<'a>(
        &self,
        user: &User,
        password_hash: Option<&'a str>,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let row = NewUserRow {
            id: *user.id().as_uuid(),
            name: user.name().as_ref(),
            email: user.email().as_ref(),
            password_hash,
            provider: user.provider().as_str(),
            created_at: user.created_at(),
        };

        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    UserPersistenceError::duplicate_email()
                } else {
                    diesel_error(err)
                }
            })?;
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let row = users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;

        row.map(|row| row_to_user(row).map(|(user, _)| user))
            .transpose()
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let row = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;

        row.map(|row| row_to_user(row).map(|(user, _)| user))
            .transpose()
    }

    async fn find_credentials(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<CredentialRecord>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let row = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;

        row.map(|row| {
            row_to_user(row).map(|(user, password_hash)| CredentialRecord {
                user,
                password_hash,
            })
        })
        .transpose()
    }

    async fn resolve(&self, ids: &[UserId]) -> Result<HashMap<UserId, User>, UserPersistenceError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let uuids: Vec<uuid::Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let rows = users::table
            .filter(users::id.eq_any(uuids))
            .select(UserRow::as_select())
            .load::<UserRow>(&mut conn)
            .await
            .map_err(diesel_error)?;

        let mut resolved = HashMap::with_capacity(rows.len());
        for row in rows {
            let (user, _) = row_to_user(row)?;
            resolved.insert(*user.id(), user);
        }
        Ok(resolved)
    }
}
