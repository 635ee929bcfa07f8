//! Port for user identity persistence.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::ids::UserId;
use crate::domain::user::{EmailAddress, User};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "user repository query failed: {message}",
        /// The email address is already registered (unique, case-insensitive).
        DuplicateEmail =>
            "email address is already registered",
    }
}

/// A user together with the stored credential hash, consulted only by the
/// auth service during login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    pub user: User,
    /// Absent for accounts created through an external identity provider.
    pub password_hash: Option<String>,
}

/// Port for writing and reading user identities.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new user. The credential hash is stored alongside the
    /// identity but never leaves the persistence boundary otherwise.
    ///
    /// The lifetime is named because the hash is a reference inside a
    /// generic type, which the generated mock cannot elide.
    async fn insert<'a>(
        &self,
        user: &User,
        password_hash: Option<&'a str>,
    ) -> Result<(), UserPersistenceError>;

    /// Find a user by id.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Find a user by (lowercased) email address.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Find a user and their credential hash by email address.
    async fn find_credentials(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<CredentialRecord>, UserPersistenceError>;

    /// Bulk-resolve ids to users for display projections. Unknown ids are
    /// simply absent from the result.
    async fn resolve(
        &self,
        ids: &[UserId],
    ) -> Result<HashMap<UserId, User>, UserPersistenceError>;
}
