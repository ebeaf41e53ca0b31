//! Async connection pool over a DB2 for i driver.
//!
//! The native driver is consumed through the [`driver`] traits; the pool
//! hands out [`PooledConnection`]s, each holding one session plus a ready
//! statement, and grows by a fixed increment whenever every connection is
//! checked out.

pub mod config;
pub mod driver;
pub mod error;
pub mod params;
pub mod pool;
pub mod prelude;
pub mod results;
pub mod types;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use config::{DEFAULT_INCREMENT_SIZE, DatabaseConfig, LOCAL_DATABASE, PoolBuilder, PoolOptions};
pub use driver::{Connection, Driver, Statement};
pub use error::{Db2PoolError, DriverError};
pub use params::{BindParam, format_params, params_from_json};
pub use pool::{ConnectionPool, PooledConnection};
pub use results::DbRow;
pub use types::{BindDirection, BindType, ParamValue, RowValues};
