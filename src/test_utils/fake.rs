//! In-memory stand-in for a DB2 for i driver.
//!
//! Every call is recorded so tests can assert on ordering, and individual
//! operations can be made to fail on demand.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::driver::{Connection, Driver, Statement};
use crate::error::DriverError;
use crate::params::BindParam;
use crate::results::DbRow;

/// A driver call observed by [`FakeDriver`].
#[derive(Debug, Clone, PartialEq)]
pub enum FakeCall {
    SetDebug { conn: usize, enabled: bool },
    Connect {
        conn: usize,
        url: String,
        username: Option<String>,
        password: Option<String>,
    },
    NewStatement { conn: usize, stmt: usize },
    Prepare { stmt: usize, sql: String },
    Bind { stmt: usize, params: Vec<BindParam> },
    Execute { stmt: usize },
    Exec { stmt: usize, sql: String },
    FetchAll { stmt: usize },
    CloseStatement { stmt: usize },
    Disconnect { conn: usize },
    Close { conn: usize },
}

#[derive(Default)]
struct FakeState {
    calls: Mutex<Vec<FakeCall>>,
    results: Mutex<HashMap<String, Result<Vec<DbRow>, DriverError>>>,
    next_conn: AtomicUsize,
    next_stmt: AtomicUsize,
    fail_connect: AtomicBool,
    fail_statement_close: AtomicBool,
    fail_disconnect: AtomicBool,
    fail_close: AtomicBool,
    disconnect_gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeState {
    fn record(&self, call: FakeCall) {
        lock(&self.calls).push(call);
    }

    fn result_for(&self, sql: &str) -> Result<Vec<DbRow>, DriverError> {
        lock(&self.results)
            .get(sql)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Scriptable fake driver. Cloning shares the same state.
#[derive(Clone, Default)]
pub struct FakeDriver {
    state: Arc<FakeState>,
}

impl std::fmt::Debug for FakeDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FakeDriver")
            .field("connections", &self.connections_opened())
            .field("statements", &self.statements_issued())
            .finish_non_exhaustive()
    }
}

impl FakeDriver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows (or an error) returned when `sql` is run through `exec`, or
    /// prepared and then executed/fetched. Unscripted SQL succeeds with no rows.
    pub fn set_result(&self, sql: &str, result: Result<Vec<DbRow>, DriverError>) {
        lock(&self.state.results).insert(sql.to_owned(), result);
    }

    pub fn fail_connect(&self, fail: bool) {
        self.state.fail_connect.store(fail, Ordering::SeqCst);
    }

    pub fn fail_statement_close(&self, fail: bool) {
        self.state.fail_statement_close.store(fail, Ordering::SeqCst);
    }

    pub fn fail_disconnect(&self, fail: bool) {
        self.state.fail_disconnect.store(fail, Ordering::SeqCst);
    }

    pub fn fail_close(&self, fail: bool) {
        self.state.fail_close.store(fail, Ordering::SeqCst);
    }

    /// Make every later `disconnect` wait until the returned gate is notified,
    /// once per waiting connection.
    #[must_use]
    pub fn hold_disconnect(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *lock(&self.state.disconnect_gate) = Some(Arc::clone(&gate));
        gate
    }

    #[must_use]
    pub fn calls(&self) -> Vec<FakeCall> {
        lock(&self.state.calls).clone()
    }

    pub fn clear_calls(&self) {
        lock(&self.state.calls).clear();
    }

    #[must_use]
    pub fn connections_opened(&self) -> usize {
        self.state.next_conn.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn statements_issued(&self) -> usize {
        self.state.next_stmt.load(Ordering::SeqCst)
    }
}

impl Driver for FakeDriver {
    fn connection(&self) -> Result<Box<dyn Connection>, DriverError> {
        let id = self.state.next_conn.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeConnection {
            id,
            state: Arc::clone(&self.state),
            connected: false,
        }))
    }
}

struct FakeConnection {
    id: usize,
    state: Arc<FakeState>,
    connected: bool,
}

#[async_trait]
impl Connection for FakeConnection {
    async fn connect(
        &mut self,
        url: &str,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<(), DriverError> {
        self.state.record(FakeCall::Connect {
            conn: self.id,
            url: url.to_owned(),
            username: username.map(str::to_owned),
            password: password.map(str::to_owned),
        });
        if self.state.fail_connect.load(Ordering::SeqCst) {
            return Err(DriverError::new("SQLConnect failed").with_sqlstate("08001"));
        }
        self.connected = true;
        Ok(())
    }

    async fn statement(&self) -> Result<Arc<dyn Statement>, DriverError> {
        if !self.connected {
            return Err(DriverError::new("connection not open").with_sqlstate("08003"));
        }
        let stmt = self.state.next_stmt.fetch_add(1, Ordering::SeqCst);
        self.state.record(FakeCall::NewStatement {
            conn: self.id,
            stmt,
        });
        Ok(Arc::new(FakeStatement {
            id: stmt,
            state: Arc::clone(&self.state),
            prepared: Mutex::new(None),
        }))
    }

    async fn disconnect(&mut self) -> Result<(), DriverError> {
        self.state.record(FakeCall::Disconnect { conn: self.id });
        let gate = lock(&self.state.disconnect_gate).clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.state.fail_disconnect.load(Ordering::SeqCst) {
            return Err(DriverError::new("SQLDisconnect failed").with_sqlstate("25000"));
        }
        self.connected = false;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), DriverError> {
        self.state.record(FakeCall::Close { conn: self.id });
        if self.state.fail_close.load(Ordering::SeqCst) {
            return Err(DriverError::new("SQLFreeConnect failed"));
        }
        Ok(())
    }

    async fn set_debug(&mut self, enabled: bool) -> Result<(), DriverError> {
        self.state.record(FakeCall::SetDebug {
            conn: self.id,
            enabled,
        });
        Ok(())
    }
}

struct FakeStatement {
    id: usize,
    state: Arc<FakeState>,
    prepared: Mutex<Option<String>>,
}

impl FakeStatement {
    fn prepared_sql(&self) -> Result<String, DriverError> {
        lock(&self.prepared)
            .clone()
            .ok_or_else(|| DriverError::new("statement not prepared").with_sqlstate("HY010"))
    }
}

#[async_trait]
impl Statement for FakeStatement {
    async fn prepare(&self, sql: &str) -> Result<(), DriverError> {
        self.state.record(FakeCall::Prepare {
            stmt: self.id,
            sql: sql.to_owned(),
        });
        *lock(&self.prepared) = Some(sql.to_owned());
        Ok(())
    }

    async fn bind_params(&self, params: &[BindParam]) -> Result<(), DriverError> {
        self.state.record(FakeCall::Bind {
            stmt: self.id,
            params: params.to_vec(),
        });
        Ok(())
    }

    async fn execute(&self) -> Result<Vec<DbRow>, DriverError> {
        self.state.record(FakeCall::Execute { stmt: self.id });
        let sql = self.prepared_sql()?;
        // output parameters are not modelled; rows come from fetch_all
        self.state.result_for(&sql).map(|_| Vec::new())
    }

    async fn exec(&self, sql: &str) -> Result<Vec<DbRow>, DriverError> {
        self.state.record(FakeCall::Exec {
            stmt: self.id,
            sql: sql.to_owned(),
        });
        self.state.result_for(sql)
    }

    async fn fetch_all(&self) -> Result<Vec<DbRow>, DriverError> {
        self.state.record(FakeCall::FetchAll { stmt: self.id });
        let sql = self.prepared_sql()?;
        let rows = self.state.result_for(&sql)?;
        if rows.is_empty() {
            return Err(DriverError::new("cursor not open").with_sqlstate("24000"));
        }
        Ok(rows)
    }

    async fn close(&self) -> Result<(), DriverError> {
        self.state.record(FakeCall::CloseStatement { stmt: self.id });
        if self.state.fail_statement_close.load(Ordering::SeqCst) {
            return Err(DriverError::new("SQLFreeStmt failed"));
        }
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
