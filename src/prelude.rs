//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::config::{
    DEFAULT_INCREMENT_SIZE, DatabaseConfig, LOCAL_DATABASE, PoolBuilder, PoolOptions,
};
pub use crate::driver::{Connection, Driver, Statement};
pub use crate::error::{Db2PoolError, DriverError};
pub use crate::params::{BindParam, format_params, params_from_json};
pub use crate::pool::{ConnectionPool, PooledConnection};
pub use crate::results::DbRow;
pub use crate::types::{BindDirection, BindType, ParamValue, RowValues};
