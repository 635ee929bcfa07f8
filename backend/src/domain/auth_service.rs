//! Registration and authentication domain service.
//!
//! Login failures share a single message regardless of whether the email is
//! unknown, the password is wrong, or the account belongs to an external
//! provider; callers cannot probe which accounts exist.

use std::sync::Arc;

use chrono::Utc;

use async_trait::async_trait;

use crate::domain::error::Error;
use crate::domain::ids::UserId;
use crate::domain::ports::{
    AuthOps, ExternalIdentityVerifier, IdentityVerificationError, LoginRequest, PasswordHasher,
    RegisterRequest, UserPersistenceError, UserProfilePayload, UserRepository,
};
use crate::domain::user::{AuthProvider, User};

const BAD_CREDENTIALS: &str = "invalid email or password";

/// Authentication service over the user store, credential hasher and
/// external identity verifier.
#[derive(Clone)]
pub struct AuthService<R, H, V> {
    users: Arc<R>,
    hasher: Arc<H>,
    verifier: Arc<V>,
}

impl<R, H, V> AuthService<R, H, V> {
    /// Create the service with its collaborators.
    pub fn new(users: Arc<R>, hasher: Arc<H>, verifier: Arc<V>) -> Self {
        Self {
            users,
            hasher,
            verifier,
        }
    }
}

#[async_trait]
impl<R, H, V> AuthOps for AuthService<R, H, V>
where
    R: UserRepository,
    H: PasswordHasher,
    V: ExternalIdentityVerifier,
{
    async fn register(&self, request: RegisterRequest) -> Result<UserProfilePayload, Error> {
        let hash = self.hasher.hash(&request.password)?;
        let user = User::new(
            UserId::random(),
            request.name,
            request.email,
            AuthProvider::Local,
            Utc::now(),
        );
        self.users.insert(&user, Some(&hash)).await?;
        tracing::info!(user_id = %user.id(), "registered new user");
        Ok(UserProfilePayload::from(user))
    }

    async fn login(&self, request: LoginRequest) -> Result<UserProfilePayload, Error> {
        let Some(record) = self.users.find_credentials(&request.email).await? else {
            return Err(Error::unauthorized(BAD_CREDENTIALS));
        };
        if record.user.provider() != AuthProvider::Local {
            return Err(Error::unauthorized(BAD_CREDENTIALS));
        }
        let Some(hash) = record.password_hash.as_deref() else {
            return Err(Error::unauthorized(BAD_CREDENTIALS));
        };
        if !self.hasher.verify(&request.password, hash)? {
            return Err(Error::unauthorized(BAD_CREDENTIALS));
        }
        Ok(UserProfilePayload::from(record.user))
    }

    async fn login_external(&self, token: &str) -> Result<UserProfilePayload, Error> {
        let identity = self.verifier.verify(token).await.map_err(|err| match err {
            IdentityVerificationError::Rejected { .. } => {
                Error::unauthorized("external identity was rejected")
            }
            IdentityVerificationError::Unavailable { .. } => {
                Error::service_unavailable("identity provider is unavailable")
            }
        })?;

        if let Some(existing) = self.users.find_by_email(&identity.email).await? {
            return Ok(UserProfilePayload::from(existing));
        }

        let user = User::new(
            UserId::random(),
            identity.name,
            identity.email.clone(),
            identity.provider,
            Utc::now(),
        );
        match self.users.insert(&user, None).await {
            Ok(()) => {
                tracing::info!(user_id = %user.id(), provider = user.provider().as_str(),
                    "created account from external identity");
                Ok(UserProfilePayload::from(user))
            }
            // A concurrent first login for the same identity beat us to the
            // insert; the account it created is the one to use.
            Err(UserPersistenceError::DuplicateEmail) => {
                let existing = self
                    .users
                    .find_by_email(&identity.email)
                    .await?
                    .ok_or_else(|| Error::internal("account vanished after duplicate insert"))?;
                Ok(UserProfilePayload::from(existing))
            }
            Err(other) => Err(other.into()),
        }
    }

    async fn current_user(&self, actor: UserId) -> Result<UserProfilePayload, Error> {
        let user = self
            .users
            .find_by_id(&actor)
            .await?
            .ok_or_else(|| Error::unauthorized("session is no longer valid"))?;
        Ok(UserProfilePayload::from(user))
    }
}

#[cfg(test)]
#[path = "auth_service_tests.rs"]
mod tests;
