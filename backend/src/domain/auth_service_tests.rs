//! Tests for the authentication service.

use std::sync::Arc;

use chrono::Utc;
use mockall::predicate::eq;

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::{
    CredentialRecord, ExternalIdentity, MockExternalIdentityVerifier, MockPasswordHasher,
    MockUserRepository,
};
use crate::domain::user::{EmailAddress, UserName};

fn sample_user(provider: AuthProvider) -> User {
    User::new(
        UserId::random(),
        UserName::new("Ada").expect("valid name"),
        EmailAddress::new("ada@example.com").expect("valid email"),
        provider,
        Utc::now(),
    )
}

fn service(
    users: MockUserRepository,
    hasher: MockPasswordHasher,
    verifier: MockExternalIdentityVerifier,
) -> AuthService<MockUserRepository, MockPasswordHasher, MockExternalIdentityVerifier> {
    AuthService::new(Arc::new(users), Arc::new(hasher), Arc::new(verifier))
}

#[tokio::test]
async fn register_hashes_and_persists() {
    let mut users = MockUserRepository::new();
    users
        .expect_insert()
        .withf(|user, hash| {
            user.provider() == AuthProvider::Local && *hash == Some("hashed")
        })
        .times(1)
        .return_once(|_, _| Ok(()));

    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .with(eq("s3cret-pass"))
        .times(1)
        .return_once(|_| Ok("hashed".to_owned()));

    let service = service(users, hasher, MockExternalIdentityVerifier::new());
    let profile = service
        .register(RegisterRequest {
            name: UserName::new("Ada").expect("valid name"),
            email: EmailAddress::new("ada@example.com").expect("valid email"),
            password: "s3cret-pass".to_owned(),
        })
        .await
        .expect("registration succeeds");

    assert_eq!(profile.email, "ada@example.com");
    assert_eq!(profile.provider, AuthProvider::Local);
}

#[tokio::test]
async fn register_duplicate_email_conflicts() {
    let mut users = MockUserRepository::new();
    users
        .expect_insert()
        .return_once(|_, _| Err(UserPersistenceError::duplicate_email()));

    let mut hasher = MockPasswordHasher::new();
    hasher.expect_hash().return_once(|_| Ok("hashed".to_owned()));

    let service = service(users, hasher, MockExternalIdentityVerifier::new());
    let error = service
        .register(RegisterRequest {
            name: UserName::new("Ada").expect("valid name"),
            email: EmailAddress::new("ada@example.com").expect("valid email"),
            password: "s3cret-pass".to_owned(),
        })
        .await
        .expect_err("duplicate email");

    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[tokio::test]
async fn login_succeeds_with_matching_password() {
    let user = sample_user(AuthProvider::Local);
    let expected_id = *user.id();

    let mut users = MockUserRepository::new();
    users.expect_find_credentials().return_once(move |_| {
        Ok(Some(CredentialRecord {
            user,
            password_hash: Some("stored-hash".to_owned()),
        }))
    });

    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_verify()
        .with(eq("s3cret-pass"), eq("stored-hash"))
        .return_once(|_, _| Ok(true));

    let service = service(users, hasher, MockExternalIdentityVerifier::new());
    let profile = service
        .login(LoginRequest {
            email: EmailAddress::new("ada@example.com").expect("valid email"),
            password: "s3cret-pass".to_owned(),
        })
        .await
        .expect("login succeeds");

    assert_eq!(profile.id, expected_id);
}

#[tokio::test]
async fn login_failures_share_one_message() {
    // Unknown email.
    let mut users = MockUserRepository::new();
    users.expect_find_credentials().return_once(|_| Ok(None));
    let unknown = service(users, MockPasswordHasher::new(), MockExternalIdentityVerifier::new())
        .login(LoginRequest {
            email: EmailAddress::new("ada@example.com").expect("valid email"),
            password: "whatever".to_owned(),
        })
        .await
        .expect_err("unknown email");

    // Wrong password.
    let mut users = MockUserRepository::new();
    let user = sample_user(AuthProvider::Local);
    users.expect_find_credentials().return_once(move |_| {
        Ok(Some(CredentialRecord {
            user,
            password_hash: Some("stored-hash".to_owned()),
        }))
    });
    let mut hasher = MockPasswordHasher::new();
    hasher.expect_verify().return_once(|_, _| Ok(false));
    let wrong = service(users, hasher, MockExternalIdentityVerifier::new())
        .login(LoginRequest {
            email: EmailAddress::new("ada@example.com").expect("valid email"),
            password: "whatever".to_owned(),
        })
        .await
        .expect_err("wrong password");

    // External-provider account has no local credential.
    let mut users = MockUserRepository::new();
    let user = sample_user(AuthProvider::Google);
    users.expect_find_credentials().return_once(move |_| {
        Ok(Some(CredentialRecord {
            user,
            password_hash: None,
        }))
    });
    let external = service(users, MockPasswordHasher::new(), MockExternalIdentityVerifier::new())
        .login(LoginRequest {
            email: EmailAddress::new("ada@example.com").expect("valid email"),
            password: "whatever".to_owned(),
        })
        .await
        .expect_err("external account");

    for error in [unknown, wrong, external] {
        assert_eq!(error.code(), ErrorCode::Unauthorized);
        assert_eq!(error.message(), "invalid email or password");
    }
}

#[tokio::test]
async fn login_external_creates_account_on_first_login() {
    let mut verifier = MockExternalIdentityVerifier::new();
    verifier.expect_verify().with(eq("provider-token")).return_once(|_| {
        Ok(ExternalIdentity {
            name: UserName::new("Ada").expect("valid name"),
            email: EmailAddress::new("ada@example.com").expect("valid email"),
            provider: AuthProvider::Github,
        })
    });

    let mut users = MockUserRepository::new();
    users.expect_find_by_email().return_once(|_| Ok(None));
    users
        .expect_insert()
        .withf(|user, hash| user.provider() == AuthProvider::Github && hash.is_none())
        .times(1)
        .return_once(|_, _| Ok(()));

    let service = service(users, MockPasswordHasher::new(), verifier);
    let profile = service
        .login_external("provider-token")
        .await
        .expect("first external login");

    assert_eq!(profile.provider, AuthProvider::Github);
}

#[tokio::test]
async fn login_external_reuses_existing_account() {
    let user = sample_user(AuthProvider::Github);
    let expected_id = *user.id();

    let mut verifier = MockExternalIdentityVerifier::new();
    verifier.expect_verify().return_once(|_| {
        Ok(ExternalIdentity {
            name: UserName::new("Ada").expect("valid name"),
            email: EmailAddress::new("ada@example.com").expect("valid email"),
            provider: AuthProvider::Github,
        })
    });

    let mut users = MockUserRepository::new();
    users.expect_find_by_email().return_once(move |_| Ok(Some(user)));
    users.expect_insert().times(0);

    let service = service(users, MockPasswordHasher::new(), verifier);
    let profile = service
        .login_external("provider-token")
        .await
        .expect("repeat external login");

    assert_eq!(profile.id, expected_id);
}

#[tokio::test]
async fn login_external_rejected_token_is_unauthorized() {
    let mut verifier = MockExternalIdentityVerifier::new();
    verifier
        .expect_verify()
        .return_once(|_| Err(IdentityVerificationError::rejected("bad token")));

    let service = service(MockUserRepository::new(), MockPasswordHasher::new(), verifier);
    let error = service
        .login_external("provider-token")
        .await
        .expect_err("rejected token");

    assert_eq!(error.code(), ErrorCode::Unauthorized);
}

#[tokio::test]
async fn current_user_with_stale_session_is_unauthorized() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().return_once(|_| Ok(None));

    let service = service(
        users,
        MockPasswordHasher::new(),
        MockExternalIdentityVerifier::new(),
    );
    let error = service
        .current_user(UserId::random())
        .await
        .expect_err("stale session");

    assert_eq!(error.code(), ErrorCode::Unauthorized);
}
