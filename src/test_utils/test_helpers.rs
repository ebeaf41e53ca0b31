//! Helper utilities for testing and development.

use std::sync::Arc;

use crate::config::{DatabaseConfig, PoolOptions};
use crate::error::Db2PoolError;
use crate::pool::ConnectionPool;
use crate::results::{DbRow, rows_from_values};
use crate::types::RowValues;

use super::FakeDriver;

/// Create rows sharing the given column names.
#[must_use]
pub fn create_test_rows(column_names: &[&str], values: Vec<Vec<RowValues>>) -> Vec<DbRow> {
    rows_from_values(column_names, values)
}

/// Build a local pool of `increment_size` over a fresh [`FakeDriver`].
///
/// # Errors
/// Propagates pool construction failures.
pub async fn fake_pool(
    increment_size: usize,
) -> Result<(FakeDriver, ConnectionPool), Db2PoolError> {
    let driver = FakeDriver::new();
    let pool = ConnectionPool::new(
        Arc::new(driver.clone()),
        DatabaseConfig::default(),
        PoolOptions {
            increment_size,
            debug: false,
        },
    )
    .await?;
    Ok((driver, pool))
}
