//! bb8-backed Diesel connection pooling.
//!
//! Repositories borrow connections through [`DbPool::get`]; the handle is
//! cheap to clone and shared across every adapter.

use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};

/// A pooled Postgres connection, held for one query sequence.
pub type DbConnection<'a> = PooledConnection<'a, AsyncPgConnection>;

/// Failure talking to the pool rather than to the database itself.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// The pool could not be brought up at startup.
    #[error("pool startup failed: {0}")]
    Startup(String),

    /// No connection became available within the checkout timeout.
    #[error("no database connection available: {0}")]
    Exhausted(String),
}

/// Pool sizing and timeout knobs.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    database_url: String,
    max_connections: u32,
    checkout_timeout: Duration,
}

impl PoolConfig {
    /// Configuration with defaults: ten connections, thirty second checkout
    /// timeout.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: 10,
            checkout_timeout: Duration::from_secs(30),
        }
    }

    /// Cap the number of open connections.
    #[must_use]
    pub fn max_connections(mut self, limit: u32) -> Self {
        self.max_connections = limit;
        self
    }

    /// Bound how long a checkout may wait for a free connection.
    #[must_use]
    pub fn checkout_timeout(mut self, timeout: Duration) -> Self {
        self.checkout_timeout = timeout;
        self
    }
}

/// Cloneable handle to the shared async connection pool.
#[derive(Clone)]
pub struct DbPool {
    inner: Pool<AsyncPgConnection>,
}

impl DbPool {
    /// Bring up the pool against the configured database.
    ///
    /// # Errors
    ///
    /// [`PoolError::Startup`] when the pool cannot be constructed, for
    /// example on a malformed database URL.
    pub async fn new(config: PoolConfig) -> Result<Self, PoolError> {
        let manager =
            AsyncDieselConnectionManager::<AsyncPgConnection>::new(&config.database_url);
        let inner = Pool::builder()
            .max_size(config.max_connections)
            .connection_timeout(config.checkout_timeout)
            .build(manager)
            .await
            .map_err(|error| PoolError::Startup(error.to_string()))?;
        Ok(Self { inner })
    }

    /// Borrow a connection.
    ///
    /// # Errors
    ///
    /// [`PoolError::Exhausted`] when no connection frees up within the
    /// checkout timeout.
    pub async fn get(&self) -> Result<DbConnection<'_>, PoolError> {
        self.inner
            .get()
            .await
            .map_err(|error| PoolError::Exhausted(error.to_string()))
    }
}
