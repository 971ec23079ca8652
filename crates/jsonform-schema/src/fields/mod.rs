//! Built-in converters, one module per field variant.
//!
//! Each module exposes a `compile` function with the registry
//! [`Constructor`](crate::registry::Constructor) signature. A converter
//! checks the schema keys against its variant's lists, extracts typed
//! attributes and validators, recurses into children through the compile
//! context, and assembles the descriptor.

pub mod array;
pub mod boolean;
pub mod number;
pub mod object;
pub mod string;

use serde_json::Value;

use crate::error::CompileError;

/// A non-negative integer keyword such as `maxLength` or `minItems`.
pub(crate) fn usize_key(field: &str, key: &str, value: &Value) -> Result<usize, CompileError> {
    value
        .as_u64()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| CompileError::invalid(field, format!("'{key}' must be a non-negative integer, got {value}")))
}

/// A numeric keyword such as `minimum`.
pub(crate) fn number_key(field: &str, key: &str, value: &Value) -> Result<f64, CompileError> {
    value
        .as_f64()
        .ok_or_else(|| CompileError::invalid(field, format!("'{key}' must be a number, got {value}")))
}

/// The `enum` values of a string field as select options.
///
/// Numbers and booleans are accepted and shown as text; nested values are
/// not.
pub(crate) fn enum_choices(field: &str, value: &Value) -> Result<Vec<String>, CompileError> {
    let Value::Array(values) = value else {
        return Err(CompileError::invalid(field, "'enum' must be an array"));
    };
    values
        .iter()
        .map(|choice| match choice {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            other => Err(CompileError::combination(
                field,
                format!("enum value {other} cannot be offered as a choice"),
            )),
        })
        .collect()
}
