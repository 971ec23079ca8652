//! # Error Types
//!
//! Errors raised while moving values in and out of fields, and while loading
//! configuration. Invalid user input is never an error here: it is reported
//! through [`crate::ValidationResult`].

use thiserror::Error;

/// Error converting between a field's editable text and its typed value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BindingError {
    /// Editable text did not parse under the field's type or format.
    #[error("cannot read {value:?} as {target}: {reason}")]
    Parse {
        /// The raw text that was rejected.
        value: String,
        /// Name of the target representation (e.g. `integer`, `date`).
        target: String,
        /// Parser message.
        reason: String,
    },

    /// A native value had the wrong JSON shape for the field.
    #[error("field '{field}' expects {expected}, got {actual}")]
    Shape {
        /// Dotted path of the field.
        field: String,
        /// Expected shape.
        expected: String,
        /// Shape actually found.
        actual: String,
    },
}

impl BindingError {
    /// Create a parse error for `value` targeting `target`.
    pub fn parse(value: &str, target: &str, reason: impl ToString) -> Self {
        Self::Parse {
            value: value.to_string(),
            target: target.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a shape error, naming the JSON type actually found.
    pub fn shape(field: impl Into<String>, expected: impl Into<String>, actual: &serde_json::Value) -> Self {
        Self::Shape {
            field: field.into(),
            expected: expected.into(),
            actual: json_type_name(actual).to_string(),
        }
    }

    /// Prefix the field path of a shape error with `parent`.
    ///
    /// List indices (`[0]`) attach without a separating dot.
    pub fn within(self, parent: &str) -> Self {
        match self {
            Self::Shape {
                field,
                expected,
                actual,
            } if !parent.is_empty() => Self::Shape {
                field: if field.is_empty() {
                    parent.to_string()
                } else if field.starts_with('[') {
                    format!("{parent}{field}")
                } else {
                    format!("{parent}.{field}")
                },
                expected,
                actual,
            },
            other => other,
        }
    }
}

/// Name of the JSON type of `value`, as used in error messages.
pub fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable held a value that could not be parsed.
    #[error("invalid value {value:?} for {var}: {reason}")]
    InvalidValue {
        /// Variable name.
        var: String,
        /// Raw value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A date or date-time pattern is not a valid strftime pattern.
    #[error("invalid {name} pattern {pattern:?}")]
    InvalidPattern {
        /// Which pattern (`date` or `date-time`).
        name: &'static str,
        /// The rejected pattern.
        pattern: String,
    },

    /// The maximum reference depth must allow at least the root object.
    #[error("max_depth must be at least 1")]
    ZeroDepth,
}
