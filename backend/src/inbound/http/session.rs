//! Cookie-session login state.
//!
//! [`SessionContext`] is the only way handlers touch the session: they
//! persist a user id at login, require one on protected routes, and purge it
//! at logout. The stored value is the raw UUID; anything unreadable is
//! treated as logged out rather than surfaced as an error.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use uuid::Uuid;

use crate::domain::{Error, UserId};

pub(crate) const SESSION_USER_KEY: &str = "uid";

/// Login state extracted from the request's cookie session.
#[derive(Clone)]
pub struct SessionContext {
    inner: Session,
}

impl SessionContext {
    /// Record the authenticated user in the session.
    pub fn persist_user(&self, user_id: &UserId) -> Result<(), Error> {
        self.inner
            .insert(SESSION_USER_KEY, user_id.as_uuid())
            .map_err(|error| Error::internal(format!("session write failed: {error}")))
    }

    /// The logged-in user, when the session holds a readable id.
    pub fn user_id(&self) -> Option<UserId> {
        match self.inner.get::<Uuid>(SESSION_USER_KEY) {
            Ok(stored) => stored.map(UserId::from_uuid),
            Err(error) => {
                tracing::warn!(%error, "unreadable session entry, treating as anonymous");
                None
            }
        }
    }

    /// The logged-in user, or `401 Unauthorized`.
    pub fn require_user_id(&self) -> Result<UserId, Error> {
        self.user_id()
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Purge the session, logging the user out.
    pub fn clear(&self) {
        self.inner.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(|inner| Self { inner }) })
    }
}
