use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::Mutex as AsyncMutex;

use crate::config::DatabaseConfig;
use crate::driver::{Connection, Driver, Statement};
use crate::error::Db2PoolError;

/// One pooled session: a connection, its current statement and a checkout flag.
///
/// A slot is handed out by [`ConnectionPool::attach`](super::ConnectionPool::attach)
/// and given back through `detach`, which closes the used statement and puts a
/// fresh one in its place before the slot becomes available again.
pub struct PooledConnection {
    index: usize,
    config: DatabaseConfig,
    debug: bool,
    driver: Arc<dyn Driver>,
    connection: AsyncMutex<Option<Box<dyn Connection>>>,
    // never held across an await
    statement: Mutex<Option<Arc<dyn Statement>>>,
    available: AtomicBool,
    retired: AtomicBool,
}

impl std::fmt::Debug for PooledConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledConnection")
            .field("index", &self.index)
            .field("url", &self.config.url)
            .field("available", &self.is_available())
            .field("retired", &self.is_retired())
            .finish_non_exhaustive()
    }
}

impl PooledConnection {
    /// Open a connection and its first statement.
    ///
    /// # Errors
    /// Propagates any failure from connecting or allocating the statement.
    pub async fn new(
        index: usize,
        config: DatabaseConfig,
        debug: bool,
        driver: Arc<dyn Driver>,
    ) -> Result<Self, Db2PoolError> {
        let slot = Self {
            index,
            config,
            debug,
            driver,
            connection: AsyncMutex::new(None),
            statement: Mutex::new(None),
            available: AtomicBool::new(true),
            retired: AtomicBool::new(false),
        };
        slot.new_connection().await?;
        slot.new_statement().await?;
        Ok(slot)
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Open a new session with the stored config, replacing the current one.
    ///
    /// # Errors
    /// Returns the driver's error if the handle cannot be allocated or connected.
    pub async fn new_connection(&self) -> Result<(), Db2PoolError> {
        let mut conn = self.driver.connection()?;
        if self.debug {
            conn.set_debug(true).await?;
        }
        match self.config.credentials() {
            None => conn.connect(&self.config.url, None, None).await?,
            Some((user, password)) => {
                conn.connect(&self.config.url, Some(user), Some(password))
                    .await?;
            }
        }
        *self.connection.lock().await = Some(conn);
        Ok(())
    }

    /// Close the current statement, if any, and allocate a replacement.
    ///
    /// If the old statement fails to close no replacement is made and the slot
    /// keeps the stale handle.
    ///
    /// # Errors
    /// Returns `Db2PoolError::NewStatement` if the old statement fails to close,
    /// or the driver's error if the new one cannot be allocated.
    pub async fn new_statement(&self) -> Result<Arc<dyn Statement>, Db2PoolError> {
        if let Some(old) = self.get_statement() {
            old.close()
                .await
                .map_err(|e| Db2PoolError::NewStatement(Box::new(e.into())))?;
        }

        let stmt = {
            let conn = self.connection.lock().await;
            let conn = conn.as_ref().ok_or_else(|| {
                Db2PoolError::ConnectionError(format!("connection {} is not open", self.index))
            })?;
            conn.statement().await?
        };
        *lock_statement(&self.statement) = Some(Arc::clone(&stmt));
        Ok(stmt)
    }

    /// The statement currently owned by this slot.
    #[must_use]
    pub fn get_statement(&self) -> Option<Arc<dyn Statement>> {
        lock_statement(&self.statement).clone()
    }

    /// Disconnect, then close the underlying connection.
    ///
    /// # Errors
    /// Returns `Db2PoolError::CloseFailed` if either step fails.
    pub async fn close(&self) -> Result<(), Db2PoolError> {
        let mut guard = self.connection.lock().await;
        let conn = guard.as_mut().ok_or_else(|| {
            Db2PoolError::CloseFailed(Box::new(Db2PoolError::ConnectionError(format!(
                "connection {} is not open",
                self.index
            ))))
        })?;
        conn.disconnect()
            .await
            .map_err(|e| Db2PoolError::CloseFailed(Box::new(e.into())))?;
        conn.close()
            .await
            .map_err(|e| Db2PoolError::CloseFailed(Box::new(e.into())))?;
        Ok(())
    }

    /// Give the slot back.
    ///
    /// With `retire` the slot is taken out of circulation, then the connection
    /// is closed for good and the caller must drop the slot from its pool.
    /// Otherwise the statement is recycled and the slot is marked available.
    /// On failure the slot stays unavailable.
    ///
    /// # Errors
    /// Returns `Db2PoolError::RetireFailed` or `Db2PoolError::DetachFailed`
    /// wrapping the underlying cause.
    pub async fn detach(&self, retire: bool) -> Result<(), Db2PoolError> {
        if retire {
            // must not be claimable while close() is pending
            self.set_available(false);
            self.close().await.map_err(|e| Db2PoolError::RetireFailed {
                index: self.index,
                source: Box::new(e),
            })?;
            self.retired.store(true, Ordering::Release);
        } else {
            self.new_statement()
                .await
                .map_err(|e| Db2PoolError::DetachFailed {
                    index: self.index,
                    source: Box::new(e),
                })?;
            self.set_available(true);
        }
        Ok(())
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::Acquire)
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::Release);
    }

    #[must_use]
    pub fn is_retired(&self) -> bool {
        self.retired.load(Ordering::Acquire)
    }

    /// Atomically flip the slot from available to checked out.
    ///
    /// Returns `false` if the slot was already taken or has been retired.
    pub fn try_claim(&self) -> bool {
        if self.is_retired() {
            return false;
        }
        self.available
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

fn lock_statement(
    statement: &Mutex<Option<Arc<dyn Statement>>>,
) -> std::sync::MutexGuard<'_, Option<Arc<dyn Statement>>> {
    match statement.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
