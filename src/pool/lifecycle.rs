use std::sync::Arc;

use super::{ConnectionPool, PooledConnection};
use crate::error::Db2PoolError;

impl ConnectionPool {
    /// Recycle `conn`'s statement and make it available again.
    ///
    /// # Errors
    /// Returns `Db2PoolError::DetachFailed`; the connection then stays checked
    /// out and should be retired.
    pub async fn detach(&self, conn: &Arc<PooledConnection>) -> Result<(), Db2PoolError> {
        conn.detach(false).await?;
        if self.debug {
            tracing::debug!(index = conn.index(), "detached connection");
        }
        Ok(())
    }

    /// Close `conn` and remove it from the pool.
    ///
    /// # Errors
    /// Returns `Db2PoolError::RetireFailed` if the connection did not close
    /// cleanly. It is left in the pool in that case.
    pub async fn retire(&self, conn: &Arc<PooledConnection>) -> Result<(), Db2PoolError> {
        conn.detach(true).await?;
        if self.remove_connection(conn) && self.debug {
            tracing::debug!(index = conn.index(), "retired connection");
        }
        Ok(())
    }

    /// Detach every connection currently in the pool, in order.
    ///
    /// Stops at the first failure; connections before it have been detached.
    ///
    /// # Errors
    /// Returns the first detach failure.
    pub async fn detach_all(&self) -> Result<(), Db2PoolError> {
        for conn in self.snapshot() {
            self.detach(&conn).await?;
        }
        Ok(())
    }

    /// Detach everything, then empty the pool and close the drained connections
    /// that are not checked out.
    ///
    /// The pool is always empty afterwards; it grows again on the next
    /// [`attach`](Self::attach). A drained connection still checked out (claimed
    /// after its detach, or left behind when `detach_all` stopped early) is only
    /// dropped from the pool. Its holder keeps an open connection and should
    /// [`retire`](Self::retire) it when done.
    ///
    /// # Errors
    /// Returns the [`detach_all`](Self::detach_all) failure, if there was one,
    /// after the pool has been emptied.
    pub async fn retire_all(&self) -> Result<(), Db2PoolError> {
        let detached = self.detach_all().await;
        if let Err(err) = &detached {
            tracing::warn!(error = %err, "detach failed while retiring all connections");
        }

        let drained: Vec<Arc<PooledConnection>> = self.write_connections().drain(..).collect();
        for conn in drained {
            if !conn.try_claim() {
                tracing::warn!(
                    index = conn.index(),
                    "connection still checked out, removed from pool without closing"
                );
                continue;
            }
            if let Err(err) = conn.detach(true).await {
                tracing::warn!(
                    index = conn.index(),
                    error = %err,
                    "could not close retired connection"
                );
            }
        }
        detached
    }
}
