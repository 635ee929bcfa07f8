//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod error;
pub mod health;
pub mod invites;
pub mod projects;
pub mod session;
pub mod state;
pub mod tasks;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use error::ApiResult;
