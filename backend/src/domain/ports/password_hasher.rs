//! Port for the credential hashing collaborator.
//!
//! The concrete scheme is opaque to the domain; the argon2 adapter lives in
//! the outbound layer. Hashing is CPU-bound but cheap enough per request to
//! run inline.

use super::define_port_error;

define_port_error! {
    /// Errors raised by password hashing adapters.
    pub enum PasswordHashError {
        /// Hashing or verification failed inside the scheme.
        Scheme { message: String } =>
            "password hashing failed: {message}",
    }
}

/// Port for hashing and verifying login credentials.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password for storage.
    fn hash(&self, password: &str) -> Result<String, PasswordHashError>;

    /// Verify a plaintext password against a stored hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError>;
}
