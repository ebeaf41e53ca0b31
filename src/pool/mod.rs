pub mod connection;
mod interaction;
mod lifecycle;

pub use connection::PooledConnection;

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::Mutex as AsyncMutex;

use crate::config::{DatabaseConfig, PoolOptions};
use crate::driver::Driver;
use crate::error::Db2PoolError;

/// Expandable pool of DB2 for i connections.
///
/// The pool starts with `increment_size` connections and adds another
/// `increment_size` whenever an [`attach`](Self::attach) finds none available.
/// It never waits for a connection to be released.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use db2i_pool::prelude::*;
///
/// # async fn demo(driver: Arc<dyn Driver>) -> Result<(), Db2PoolError> {
/// let pool = ConnectionPool::builder(driver)
///     .url("*LOCAL")
///     .increment_size(4)
///     .build()
///     .await?;
///
/// let conn = pool.attach().await?;
/// if let Some(stmt) = conn.get_statement() {
///     stmt.exec("CALL QSYS2.QCMDEXC('DSPJOB')").await?;
/// }
/// pool.detach(&conn).await?;
/// # Ok(()) }
/// ```
pub struct ConnectionPool {
    connections: RwLock<Vec<Arc<PooledConnection>>>,
    config: DatabaseConfig,
    increment_size: usize,
    debug: bool,
    driver: Arc<dyn Driver>,
    // one grower at a time
    grow_lock: AsyncMutex<()>,
}

impl std::fmt::Debug for ConnectionPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionPool")
            .field("config", &self.config)
            .field("increment_size", &self.increment_size)
            .field("debug", &self.debug)
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl ConnectionPool {
    /// Create a pool and open its first `increment_size` connections.
    ///
    /// # Errors
    /// Returns `Db2PoolError::ConfigError` for invalid options, or the first
    /// connection failure.
    pub async fn new(
        driver: Arc<dyn Driver>,
        config: DatabaseConfig,
        opts: PoolOptions,
    ) -> Result<Self, Db2PoolError> {
        opts.validate()?;
        let pool = Self {
            connections: RwLock::new(Vec::with_capacity(opts.increment_size)),
            config,
            increment_size: opts.increment_size,
            debug: opts.debug,
            driver,
            grow_lock: AsyncMutex::new(()),
        };
        for index in 0..pool.increment_size {
            pool.create_connection(Some(index)).await?;
        }
        Ok(pool)
    }

    #[must_use]
    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    #[must_use]
    pub fn increment_size(&self) -> usize {
        self.increment_size
    }

    #[must_use]
    pub fn is_debug(&self) -> bool {
        self.debug
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.read_connections().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read_connections().is_empty()
    }

    #[must_use]
    pub fn available_count(&self) -> usize {
        self.read_connections()
            .iter()
            .filter(|c| c.is_available())
            .count()
    }

    /// The pooled connections in creation order, as of this call.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Arc<PooledConnection>> {
        self.read_connections().clone()
    }

    /// Open one more connection and append it to the pool.
    ///
    /// Without an explicit `index` the new connection takes the current pool
    /// length. Indices can repeat once connections have been retired.
    ///
    /// # Errors
    /// Propagates the connection failure; nothing is appended in that case.
    pub async fn create_connection(
        &self,
        index: Option<usize>,
    ) -> Result<Arc<PooledConnection>, Db2PoolError> {
        let index = index.unwrap_or_else(|| self.len());
        let conn = PooledConnection::new(
            index,
            self.config.clone(),
            self.debug,
            Arc::clone(&self.driver),
        )
        .await?;
        let conn = Arc::new(conn);
        self.write_connections().push(Arc::clone(&conn));
        if self.debug {
            tracing::debug!(index, "created pooled connection");
        }
        Ok(conn)
    }

    /// Claim the first available connection, growing the pool when none is free.
    ///
    /// # Errors
    /// Only fails when growing the pool fails to open a connection.
    pub async fn attach(&self) -> Result<Arc<PooledConnection>, Db2PoolError> {
        loop {
            if let Some(conn) = self.claim_first_available() {
                if self.debug {
                    tracing::debug!(index = conn.index(), "attached connection");
                }
                return Ok(conn);
            }

            let _grow = self.grow_lock.lock().await;
            // another task may have grown the pool while we waited
            if let Some(conn) = self.claim_first_available() {
                if self.debug {
                    tracing::debug!(index = conn.index(), "attached connection");
                }
                return Ok(conn);
            }
            for _ in 0..self.increment_size {
                self.create_connection(None).await?;
            }
            tracing::info!(
                size = self.len(),
                increment = self.increment_size,
                "connection pool exhausted, grew pool"
            );
        }
    }

    fn claim_first_available(&self) -> Option<Arc<PooledConnection>> {
        let snapshot = self.snapshot();
        snapshot.into_iter().find(|conn| conn.try_claim())
    }

    /// Remove `conn` from the pool by identity. Returns whether it was present.
    fn remove_connection(&self, conn: &Arc<PooledConnection>) -> bool {
        let mut connections = self.write_connections();
        match connections.iter().position(|c| Arc::ptr_eq(c, conn)) {
            Some(pos) => {
                connections.remove(pos);
                true
            }
            None => false,
        }
    }

    fn read_connections(&self) -> RwLockReadGuard<'_, Vec<Arc<PooledConnection>>> {
        match self.connections.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_connections(&self) -> RwLockWriteGuard<'_, Vec<Arc<PooledConnection>>> {
        match self.connections.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
