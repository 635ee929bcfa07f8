//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{AuthOps, InviteOps, ProjectOps, TaskOps};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub auth: Arc<dyn AuthOps>,
    pub projects: Arc<dyn ProjectOps>,
    pub tasks: Arc<dyn TaskOps>,
    pub invites: Arc<dyn InviteOps>,
}

impl HttpState {
    /// Bundle the four use-case ports for handler injection.
    pub fn new(
        auth: Arc<dyn AuthOps>,
        projects: Arc<dyn ProjectOps>,
        tasks: Arc<dyn TaskOps>,
        invites: Arc<dyn InviteOps>,
    ) -> Self {
        Self {
            auth,
            projects,
            tasks,
            invites,
        }
    }
}
