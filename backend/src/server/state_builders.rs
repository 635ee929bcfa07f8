//! Wiring of service implementations into handler state.

use std::sync::Arc;

use actix_web::web;

use crate::domain::ports::DisabledIdentityVerifier;
use crate::domain::{AuthService, InviteService, ProjectService, TaskService};
use crate::inbound::http::state::HttpState;
use crate::outbound::persistence::{
    DieselInviteRepository, DieselProjectRepository, DieselTaskRepository, DieselUserRepository,
};
use crate::outbound::security::Argon2PasswordHasher;

use super::ServerConfig;

/// Assemble the Diesel-backed services behind the HTTP state.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let users = Arc::new(DieselUserRepository::new(config.db_pool.clone()));
    let projects = Arc::new(DieselProjectRepository::new(config.db_pool.clone()));
    let invites = Arc::new(DieselInviteRepository::new(config.db_pool.clone()));
    let tasks = Arc::new(DieselTaskRepository::new(config.db_pool.clone()));

    let auth = AuthService::new(
        Arc::clone(&users),
        Arc::new(Argon2PasswordHasher::new()),
        Arc::new(DisabledIdentityVerifier),
    );
    let project_ops = ProjectService::new(
        Arc::clone(&projects),
        Arc::clone(&tasks),
        Arc::clone(&users),
        config.policy,
    );
    let task_ops = TaskService::new(
        Arc::clone(&tasks),
        Arc::clone(&projects),
        Arc::clone(&users),
        config.policy,
    );
    let invite_ops = InviteService::new(invites, projects, users, config.policy);

    web::Data::new(HttpState::new(
        Arc::new(auth),
        Arc::new(project_ops),
        Arc::new(task_ops),
        Arc::new(invite_ops),
    ))
}
