//! Driving port for registration and authentication use-cases.
//!
//! In hexagonal terms this is a *driving* port: inbound adapters call it to
//! establish a verified actor identity without knowing the backing
//! infrastructure. Session issuance stays in the HTTP adapter; the domain
//! only ever sees the resulting [`crate::domain::UserId`].

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::error::Error;
use crate::domain::ids::UserId;
use crate::domain::user::{AuthProvider, EmailAddress, User, UserName};

/// Registration request with boundary-validated fields.
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub name: UserName,
    pub email: EmailAddress,
    pub password: String,
}

/// Local login request.
#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub email: EmailAddress,
    pub password: String,
}

/// Public projection of a user identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfilePayload {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub provider: AuthProvider,
}

impl From<User> for UserProfilePayload {
    fn from(user: User) -> Self {
        Self {
            id: *user.id(),
            name: user.name().as_ref().to_owned(),
            email: user.email().as_ref().to_owned(),
            provider: user.provider(),
        }
    }
}

/// Domain use-case port for registration and authentication.
#[async_trait]
pub trait AuthOps: Send + Sync {
    /// Register a new local account. Duplicate emails conflict.
    async fn register(&self, request: RegisterRequest) -> Result<UserProfilePayload, Error>;

    /// Authenticate local credentials.
    async fn login(&self, request: LoginRequest) -> Result<UserProfilePayload, Error>;

    /// Authenticate a verified external identity token, creating the account
    /// on first login.
    async fn login_external(&self, token: &str) -> Result<UserProfilePayload, Error>;

    /// Look up the profile behind an authenticated session.
    async fn current_user(&self, actor: UserId) -> Result<UserProfilePayload, Error>;
}
