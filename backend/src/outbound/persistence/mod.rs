//! PostgreSQL persistence adapters.
//!
//! Each repository port from the domain has a Diesel-backed implementation
//! here. Rows are mapped to domain aggregates at the adapter boundary so the
//! domain never sees Diesel types.

mod diesel_error_mapping;
mod diesel_invite_repository;
mod diesel_project_repository;
mod diesel_task_repository;
mod diesel_user_repository;
mod models;
mod pool;
pub mod schema;

pub use diesel_invite_repository::DieselInviteRepository;
pub use diesel_project_repository::DieselProjectRepository;
pub use diesel_task_repository::DieselTaskRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbConnection, DbPool, PoolConfig, PoolError};
