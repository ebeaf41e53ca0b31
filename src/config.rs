use std::sync::Arc;

use serde::Deserialize;

use crate::driver::Driver;
use crate::error::Db2PoolError;
use crate::pool::ConnectionPool;

/// Database name that selects the local system; connects without credentials.
pub const LOCAL_DATABASE: &str = "*LOCAL";

/// Connections created by a pool each time it runs out, unless configured.
pub const DEFAULT_INCREMENT_SIZE: usize = 8;

/// Where and as whom pooled connections connect.
///
/// Missing fields fall back to the defaults, so a config file only needs the
/// keys it changes:
/// ```rust
/// use db2i_pool::prelude::*;
///
/// let cfg: DatabaseConfig = serde_json::from_str(r#"{"username": "QPGMR"}"#).unwrap();
/// assert!(cfg.is_local());
/// ```
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: LOCAL_DATABASE.to_owned(),
            username: None,
            password: None,
        }
    }
}

// Keep passwords out of logs.
impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl DatabaseConfig {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Whether this config targets the local database.
    #[must_use]
    pub fn is_local(&self) -> bool {
        self.url.eq_ignore_ascii_case(LOCAL_DATABASE)
    }

    /// Credentials to connect with: none for the local database, otherwise the
    /// configured ones with empty strings standing in for missing values.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        if self.is_local() {
            None
        } else {
            Some((
                self.username.as_deref().unwrap_or_default(),
                self.password.as_deref().unwrap_or_default(),
            ))
        }
    }
}

/// Options for pool sizing and diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PoolOptions {
    /// Connections created up front and on every growth step
    pub increment_size: usize,
    /// Emit per-checkout diagnostics and turn on driver debugging
    pub debug: bool,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            increment_size: DEFAULT_INCREMENT_SIZE,
            debug: false,
        }
    }
}

impl PoolOptions {
    /// # Errors
    /// Returns `Db2PoolError::ConfigError` if `increment_size` is zero.
    pub fn validate(&self) -> Result<(), Db2PoolError> {
        if self.increment_size == 0 {
            return Err(Db2PoolError::ConfigError(
                "increment_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Fluent builder for a [`ConnectionPool`].
pub struct PoolBuilder {
    driver: Arc<dyn Driver>,
    database: DatabaseConfig,
    opts: PoolOptions,
}

impl std::fmt::Debug for PoolBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolBuilder")
            .field("driver", &"<Driver>")
            .field("database", &self.database)
            .field("opts", &self.opts)
            .finish()
    }
}

impl PoolBuilder {
    #[must_use]
    pub fn new(driver: Arc<dyn Driver>) -> Self {
        Self {
            driver,
            database: DatabaseConfig::default(),
            opts: PoolOptions::default(),
        }
    }

    #[must_use]
    pub fn database(mut self, database: DatabaseConfig) -> Self {
        self.database = database;
        self
    }

    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.database.url = url.into();
        self
    }

    #[must_use]
    pub fn credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.database = self.database.with_credentials(username, password);
        self
    }

    #[must_use]
    pub fn options(mut self, opts: PoolOptions) -> Self {
        self.opts = opts;
        self
    }

    #[must_use]
    pub fn increment_size(mut self, increment_size: usize) -> Self {
        self.opts.increment_size = increment_size;
        self
    }

    #[must_use]
    pub fn debug(mut self, debug: bool) -> Self {
        self.opts.debug = debug;
        self
    }

    #[must_use]
    pub fn finish(self) -> (Arc<dyn Driver>, DatabaseConfig, PoolOptions) {
        (self.driver, self.database, self.opts)
    }

    /// Build the pool, opening its first batch of connections.
    ///
    /// # Errors
    ///
    /// Returns `Db2PoolError` if the options are invalid or any initial
    /// connection fails to open.
    pub async fn build(self) -> Result<ConnectionPool, Db2PoolError> {
        let (driver, database, opts) = self.finish();
        ConnectionPool::new(driver, database, opts).await
    }
}

impl ConnectionPool {
    #[must_use]
    pub fn builder(driver: Arc<dyn Driver>) -> PoolBuilder {
        PoolBuilder::new(driver)
    }
}
