use std::sync::Arc;

use super::{ConnectionPool, PooledConnection};
use crate::error::Db2PoolError;
use crate::params::{BindParam, format_params};
use crate::results::DbRow;
use crate::types::ParamValue;

impl ConnectionPool {
    /// Run `sql` on a pooled connection and give the connection back.
    ///
    /// Failures are logged, not returned: a failed statement retires the
    /// connection it ran on. `None` means no rows, whether or not the statement
    /// succeeded.
    ///
    /// # Errors
    /// Only fails if no connection could be attached.
    pub async fn run_sql(&self, sql: &str) -> Result<Option<Vec<DbRow>>, Db2PoolError> {
        let conn = self.attach().await?;
        let Some(stmt) = conn.get_statement() else {
            self.retire_after_failure(&conn, "statement missing").await;
            return Ok(None);
        };

        let rows = match stmt.exec(sql).await {
            Ok(rows) => rows,
            Err(err) => {
                tracing::error!(index = conn.index(), error = %err, sql, "exec failed");
                self.retire_after_failure(&conn, "exec failed").await;
                return Ok(None);
            }
        };

        self.release(&conn).await;
        Ok(non_empty(rows))
    }

    /// Prepare `sql`, bind `params`, execute and fetch on a pooled connection.
    ///
    /// Statements without a result set (INSERT, UPDATE, ...) make the fetch fail;
    /// that is treated as "no rows". Prepare, bind and execute failures retire
    /// the connection and yield `None`.
    ///
    /// # Errors
    /// Only fails if no connection could be attached.
    pub async fn prepare_execute(
        &self,
        sql: &str,
        params: &[ParamValue],
    ) -> Result<Option<Vec<DbRow>>, Db2PoolError> {
        self.prepare_execute_with(sql, format_params(params)).await
    }

    /// Like [`prepare_execute`](Self::prepare_execute) with parameters whose
    /// direction the caller already chose.
    ///
    /// # Errors
    /// Only fails if no connection could be attached.
    pub async fn prepare_execute_with(
        &self,
        sql: &str,
        params: Vec<BindParam>,
    ) -> Result<Option<Vec<DbRow>>, Db2PoolError> {
        let conn = self.attach().await?;
        let Some(stmt) = conn.get_statement() else {
            self.retire_after_failure(&conn, "statement missing").await;
            return Ok(None);
        };

        let executed = async {
            stmt.prepare(sql).await?;
            if !params.is_empty() {
                stmt.bind_params(&params).await?;
            }
            stmt.execute().await
        }
        .await;
        if let Err(err) = executed {
            tracing::error!(index = conn.index(), error = %err, sql, "prepare/execute failed");
            self.retire_after_failure(&conn, "prepare/execute failed").await;
            return Ok(None);
        }

        let rows = match stmt.fetch_all().await {
            Ok(rows) => rows,
            Err(err) => {
                tracing::trace!(error = %err, "no result set to fetch");
                Vec::new()
            }
        };

        self.release(&conn).await;
        Ok(non_empty(rows))
    }

    // Detach, falling back to retire when the statement can't be recycled.
    async fn release(&self, conn: &Arc<PooledConnection>) {
        if let Err(err) = self.detach(conn).await {
            tracing::error!(index = conn.index(), error = %err, "detach failed, retiring");
            self.retire_after_failure(conn, "detach failed").await;
        }
    }

    async fn retire_after_failure(&self, conn: &Arc<PooledConnection>, reason: &str) {
        if let Err(err) = self.retire(conn).await {
            tracing::error!(index = conn.index(), error = %err, reason, "retire failed");
        }
    }
}

fn non_empty(rows: Vec<DbRow>) -> Option<Vec<DbRow>> {
    if rows.is_empty() { None } else { Some(rows) }
}
