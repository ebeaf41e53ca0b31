use chrono::NaiveDateTime;
use clap::ValueEnum;

/// Values that can appear in a fetched row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowValues {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point or decimal value
    Float(f64),
    /// Character value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// NULL value
    Null,
    /// Binary data
    Blob(Vec<u8>),
}

impl RowValues {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let RowValues::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let RowValues::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<&bool> {
        if let RowValues::Bool(value) = self {
            return Some(value);
        } else if let Some(i) = self.as_int() {
            if *i == 1 {
                return Some(&true);
            } else if *i == 0 {
                return Some(&false);
            }
        }
        None
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        if let RowValues::Timestamp(value) = self {
            return Some(*value);
        } else if let Some(s) = self.as_text() {
            // DB2 for i renders timestamps as "YYYY-MM-DD-HH.MM.SS.ffffff"
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d-%H.%M.%S%.f") {
                return Some(dt);
            }
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
                return Some(dt);
            }
        }
        None
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let RowValues::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let RowValues::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }
}

/// Direction of a bound parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum BindDirection {
    /// Input only
    In,
    /// Output only
    Out,
    /// Input and output
    #[value(alias = "both")]
    InOut,
}

/// Driver-side type indicator attached to a bound parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindType {
    Char,
    Numeric,
    Null,
    Boolean,
    Blob,
}

/// A value that can be bound to a prepared statement.
///
/// The variant is decided where the value enters the crate, so formatting never
/// has to inspect a value's runtime shape:
/// ```rust
/// use db2i_pool::prelude::*;
///
/// let params: Vec<ParamValue> = vec![42.into(), "ACME".into(), None::<i64>.into()];
/// assert_eq!(params[2], ParamValue::Null);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Text(String),
    Integer(i64),
    Decimal(f64),
    Null,
    Boolean(bool),
    Binary(Vec<u8>),
}

impl ParamValue {
    /// The bind type the driver should use for this value.
    #[must_use]
    pub fn bind_type(&self) -> BindType {
        match self {
            Self::Text(_) => BindType::Char,
            // DB2 for i binds integral and fractional numbers the same way
            Self::Integer(_) | Self::Decimal(_) => BindType::Numeric,
            Self::Null => BindType::Null,
            Self::Boolean(_) => BindType::Boolean,
            Self::Binary(_) => BindType::Blob,
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Decimal(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<Vec<u8>> for ParamValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Binary(value)
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
