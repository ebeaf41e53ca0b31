use serde_json::Value as JsonValue;

use crate::error::Db2PoolError;
use crate::types::{BindDirection, BindType, ParamValue};

/// A value plus the direction and type indicators passed to
/// [`Statement::bind_params`](crate::driver::Statement::bind_params).
#[derive(Debug, Clone, PartialEq)]
pub struct BindParam {
    pub value: ParamValue,
    pub direction: BindDirection,
    pub bind_type: BindType,
}

impl BindParam {
    /// Bind `value` with an explicit direction; the type indicator follows the value.
    #[must_use]
    pub fn new(value: impl Into<ParamValue>, direction: BindDirection) -> Self {
        let value = value.into();
        let bind_type = value.bind_type();
        Self {
            value,
            direction,
            bind_type,
        }
    }
}

/// Format values for binding. Every entry is bound as [`BindDirection::InOut`].
#[must_use]
pub fn format_params(params: &[ParamValue]) -> Vec<BindParam> {
    params
        .iter()
        .map(|value| BindParam::new(value.clone(), BindDirection::InOut))
        .collect()
}

/// Convert loosely typed JSON values into bindable values.
///
/// Accepts strings, numbers, `null`, booleans, serialized binary buffers
/// (`{"type": "Buffer", "data": [..]}`) and wrapper objects carrying a `value`
/// property.
///
/// JSON `null` becomes [`ParamValue::Null`] and binds with [`BindType::Null`].
/// Callers that must refuse nulls check for `ParamValue::Null` in the result.
///
/// # Errors
/// Returns `Db2PoolError::ParameterError` naming the first value that is none of
/// the above. Nothing is returned for the values that did convert.
pub fn params_from_json(values: &[JsonValue]) -> Result<Vec<ParamValue>, Db2PoolError> {
    values.iter().map(json_to_param).collect()
}

fn json_to_param(value: &JsonValue) -> Result<ParamValue, Db2PoolError> {
    match value {
        JsonValue::String(s) => Ok(ParamValue::Text(s.clone())),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(ParamValue::Integer(i))
            } else if let Some(f) = n.as_f64() {
                Ok(ParamValue::Decimal(f))
            } else {
                Err(unsupported(value))
            }
        }
        JsonValue::Null => Ok(ParamValue::Null),
        JsonValue::Bool(b) => Ok(ParamValue::Boolean(*b)),
        JsonValue::Object(map) => {
            if let Some(bytes) = buffer_bytes(map) {
                return bytes.map(ParamValue::Binary).ok_or_else(|| unsupported(value));
            }
            match map.get("value") {
                Some(inner) => json_to_param(inner),
                None => Err(unsupported(value)),
            }
        }
        JsonValue::Array(_) => Err(unsupported(value)),
    }
}

// `Some(None)` means the object claims to be a buffer but its data is not bytes.
fn buffer_bytes(map: &serde_json::Map<String, JsonValue>) -> Option<Option<Vec<u8>>> {
    if map.get("type").and_then(JsonValue::as_str) != Some("Buffer") {
        return None;
    }
    let data = map.get("data").and_then(JsonValue::as_array)?;
    Some(
        data.iter()
            .map(|b| b.as_u64().and_then(|b| u8::try_from(b).ok()))
            .collect(),
    )
}

fn unsupported(value: &JsonValue) -> Db2PoolError {
    Db2PoolError::ParameterError(format!("unsupported bind parameter type: {value}"))
}
