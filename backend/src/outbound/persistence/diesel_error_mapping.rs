//! Error translation shared by the Diesel repositories.
//!
//! Each repository exposes only `connection` and `query` error shapes (plus
//! `duplicate_email` on users); this module folds pool and Diesel failures
//! into those, logging the raw cause at debug level before the detail is
//! dropped.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Fold a pool failure into a repository connection error.
pub(super) fn map_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Startup(message) | PoolError::Exhausted(message) => message,
    };
    connection(message)
}

/// Fold a Diesel failure into a query or connection error.
///
/// A lost connection surfaces through `connection` so callers treat it as
/// temporary unavailability; every other failure is a `query` error with a
/// generic message.
pub(super) fn map_diesel_error<E, Q, C>(error: DieselError, query: Q, connection: C) -> E
where
    Q: Fn(&'static str) -> E,
    C: Fn(&'static str) -> E,
{
    if let DieselError::DatabaseError(kind, info) = &error {
        debug!(?kind, message = info.message(), "database operation failed");
    } else {
        debug!(%error, "database operation failed");
    }

    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection lost")
        }
        _ => query("database error"),
    }
}

/// Whether the failure is a unique-constraint violation. The user repository
/// checks this to catch racing registrations on the email column.
pub(super) fn is_unique_violation(error: &DieselError) -> bool {
    matches!(
        error,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
    )
}
