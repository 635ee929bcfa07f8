//! Ports for the hexagonal architecture.
//!
//! Driving ports ([`AuthOps`], [`ProjectOps`], [`TaskOps`], [`InviteOps`])
//! are the use-case surface inbound adapters call. Driven ports (the
//! repository, hashing and identity-verification traits) are implemented by
//! outbound adapters. Mock implementations are generated for the driven
//! ports in test builds.

mod macros;

pub(crate) use macros::define_port_error;

pub mod auth_ops;
pub mod identity_verifier;
pub mod invite_ops;
pub mod invite_repository;
pub mod password_hasher;
pub mod project_ops;
pub mod project_repository;
pub mod task_ops;
pub mod task_repository;
pub mod user_repository;

pub use auth_ops::{AuthOps, LoginRequest, RegisterRequest, UserProfilePayload};
pub use identity_verifier::{
    DisabledIdentityVerifier, ExternalIdentity, ExternalIdentityVerifier,
    IdentityVerificationError,
};
pub use invite_ops::{
    InviteListPayload, InviteOps, InvitePayload, RespondToInviteRequest, SendInviteRequest,
};
pub use invite_repository::{InvitePersistenceError, InviteRepository};
pub use password_hasher::{PasswordHashError, PasswordHasher};
pub use project_ops::{
    CreateProjectRequest, ProjectDeletedPayload, ProjectOps, ProjectPayload, RoadmapEntryPayload,
    UpdateProjectRequest, UserRefPayload,
};
pub use project_repository::{ProjectPersistenceError, ProjectRepository};
pub use task_ops::{
    AppendCommentRequest, CommentPayload, CreateTaskRequest, TaskDetailPayload, TaskOps,
    TaskPayload, UpdateTaskRequest,
};
pub use task_repository::{TaskPersistenceError, TaskRepository};
pub use user_repository::{CredentialRecord, UserPersistenceError, UserRepository};

#[cfg(test)]
pub use identity_verifier::MockExternalIdentityVerifier;
#[cfg(test)]
pub use invite_repository::MockInviteRepository;
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
#[cfg(test)]
pub use project_repository::MockProjectRepository;
#[cfg(test)]
pub use task_repository::MockTaskRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
