//! Port for the external identity provider collaborator.
//!
//! OAuth handshakes happen outside this system; what arrives here is an
//! opaque provider token. The verifier turns it into a vouched-for identity
//! or rejects it. The first verified login for an unknown email creates the
//! user account.

use async_trait::async_trait;

use crate::domain::user::{AuthProvider, EmailAddress, UserName};

use super::define_port_error;

define_port_error! {
    /// Errors raised by identity verification adapters.
    pub enum IdentityVerificationError {
        /// The token was rejected by the provider.
        Rejected { message: String } =>
            "external identity rejected: {message}",
        /// The provider could not be reached.
        Unavailable { message: String } =>
            "identity provider unavailable: {message}",
    }
}

/// A verified identity vouched for by an external provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalIdentity {
    pub name: UserName,
    pub email: EmailAddress,
    pub provider: AuthProvider,
}

/// Port for verifying opaque external identity tokens.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExternalIdentityVerifier: Send + Sync {
    /// Verify a provider token and return the identity it vouches for.
    async fn verify(&self, token: &str) -> Result<ExternalIdentity, IdentityVerificationError>;
}

/// Default verifier for deployments without an external provider configured;
/// rejects every token.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledIdentityVerifier;

#[async_trait]
impl ExternalIdentityVerifier for DisabledIdentityVerifier {
    async fn verify(&self, _token: &str) -> Result<ExternalIdentity, IdentityVerificationError> {
        Err(IdentityVerificationError::rejected(
            "external login is not configured",
        ))
    }
}
