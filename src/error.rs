use thiserror::Error;

/// Failure reported by the underlying DB2 for i driver.
///
/// Drivers fill in whatever diagnostics the native layer exposes; only the
/// message is mandatory.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DriverError {
    /// Human readable diagnostic text
    pub message: String,
    /// Five character SQLSTATE, when the driver reports one
    pub sqlstate: Option<String>,
    /// Native SQLCODE, when the driver reports one
    pub code: Option<i32>,
}

impl DriverError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            sqlstate: None,
            code: None,
        }
    }

    #[must_use]
    pub fn with_sqlstate(mut self, sqlstate: impl Into<String>) -> Self {
        self.sqlstate = Some(sqlstate.into());
        self
    }

    #[must_use]
    pub fn with_code(mut self, code: i32) -> Self {
        self.code = Some(code);
        self
    }
}

#[derive(Debug, Error)]
pub enum Db2PoolError {
    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error("could not create new statement: {0}")]
    NewStatement(#[source] Box<Db2PoolError>),

    #[error("connection failed to close: {0}")]
    CloseFailed(#[source] Box<Db2PoolError>),

    #[error("failed to detach connection {index}: {source}")]
    DetachFailed {
        index: usize,
        #[source]
        source: Box<Db2PoolError>,
    },

    #[error("failed to retire connection {index}: {source}")]
    RetireFailed {
        index: usize,
        #[source]
        source: Box<Db2PoolError>,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Parameter error: {0}")]
    ParameterError(String),
}

impl Db2PoolError {
    /// The innermost driver failure in this error's cause chain, if any.
    #[must_use]
    pub fn driver_error(&self) -> Option<&DriverError> {
        match self {
            Self::Driver(err) => Some(err),
            Self::NewStatement(inner) | Self::CloseFailed(inner) => inner.driver_error(),
            Self::DetachFailed { source, .. } | Self::RetireFailed { source, .. } => {
                source.driver_error()
            }
            Self::ConfigError(_) | Self::ConnectionError(_) | Self::ParameterError(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn detach_failure_chains_back_to_driver() {
        let err = Db2PoolError::DetachFailed {
            index: 3,
            source: Box::new(Db2PoolError::NewStatement(Box::new(
                DriverError::new("SQLCloseCursor failed").with_sqlstate("24000").into(),
            ))),
        };

        assert!(err.to_string().starts_with("failed to detach connection 3"));
        let driver = err.driver_error().expect("driver cause");
        assert_eq!(driver.sqlstate.as_deref(), Some("24000"));

        let first = err.source().expect("statement cause");
        assert!(first.to_string().contains("could not create new statement"));
    }

    #[test]
    fn config_errors_have_no_driver_cause() {
        let err = Db2PoolError::ConfigError("increment_size must be positive".into());
        assert!(err.driver_error().is_none());
    }
}
