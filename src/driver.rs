//! Capabilities the pool consumes from a DB2 for i driver.
//!
//! The native binding lives outside this crate. A driver implements
//! [`Driver`] to hand out unconnected [`Connection`] handles; each connection
//! hands out [`Statement`] handles bound to it. All trait objects are
//! `Send + Sync` so pooled connections can move between tokio worker threads.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::DriverError;
use crate::params::BindParam;
use crate::results::DbRow;

/// Factory for fresh, unconnected connection handles.
pub trait Driver: Send + Sync {
    /// Allocate a new connection handle.
    ///
    /// # Errors
    /// Returns `DriverError` if the driver cannot allocate a handle.
    fn connection(&self) -> Result<Box<dyn Connection>, DriverError>;
}

/// One database session.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Open the session. `username` and `password` are `None` for the local
    /// database.
    async fn connect(
        &mut self,
        url: &str,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<(), DriverError>;

    /// Allocate a statement handle on this session.
    async fn statement(&self) -> Result<Arc<dyn Statement>, DriverError>;

    async fn disconnect(&mut self) -> Result<(), DriverError>;

    async fn close(&mut self) -> Result<(), DriverError>;

    /// Toggle the driver's own diagnostic output.
    async fn set_debug(&mut self, enabled: bool) -> Result<(), DriverError>;
}

/// A statement handle bound to one connection.
///
/// `execute` and `exec` return an empty vector when the statement produced no
/// result set.
#[async_trait]
pub trait Statement: Send + Sync {
    async fn prepare(&self, sql: &str) -> Result<(), DriverError>;

    async fn bind_params(&self, params: &[BindParam]) -> Result<(), DriverError>;

    async fn execute(&self) -> Result<Vec<DbRow>, DriverError>;

    /// Run `sql` directly without a separate prepare step.
    async fn exec(&self, sql: &str) -> Result<Vec<DbRow>, DriverError>;

    async fn fetch_all(&self) -> Result<Vec<DbRow>, DriverError>;

    async fn close(&self) -> Result<(), DriverError>;
}
