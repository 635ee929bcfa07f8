//! Domain layer: entities, value objects, policy and ports.
//!
//! Everything in this module is infrastructure-free. Adapters live under
//! `inbound` and `outbound`; the only way they touch the domain is through
//! the traits in [`ports`].

pub mod access;
pub mod auth_service;
pub mod error;
pub mod ids;
pub mod invite;
pub mod invite_service;
pub mod ports;
pub mod project;
pub mod project_service;
pub mod task;
pub mod task_service;
pub mod trace_id;
pub mod user;

pub use access::{
    CollaborationPolicy, Decision, DenyReason, ProjectAction, TaskAction, authorize_project,
    authorize_task,
};
pub use auth_service::AuthService;
pub use error::{Error, ErrorCode};
pub use ids::{IdParseError, InviteId, ProjectId, TaskId, UserId};
pub use invite::{Invite, InviteAction, InviteAlreadyResponded, InviteStatus};
pub use invite_service::InviteService;
pub use project::{
    Project, ProjectDescription, ProjectDraft, ProjectPatch, ProjectStatus, ProjectTitle,
    ProjectValidationError, RoadmapEntry, normalise_tags,
};
pub use project_service::ProjectService;
pub use task::{
    Comment, Task, TaskDraft, TaskPatch, TaskPriority, TaskStatus, TaskTitle, TaskValidationError,
};
pub use task_service::TaskService;
pub use trace_id::{TRACE_ID_HEADER, TraceId};
pub use user::{AuthProvider, EmailAddress, User, UserName, UserValidationError};
