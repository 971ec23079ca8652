//! # Data Binding — Format-Aware Coercion
//!
//! Converts between the editable text of an input field and the typed value
//! it stands for, and between typed values and their native JSON form.
//!
//! ```text
//!   native JSON  --from_native-->  TypedValue  --set-->  editable text
//!   native JSON  <--to_native---   TypedValue  <--get--  editable text
//! ```
//!
//! The coercion for a field is picked by its `format` first, then its
//! schema `type`, then falls back to identity text. Empty editable text
//! reads as "no value"; writing "no value" produces the empty string.
//!
//! Parse failures in [`Coercion::get`] are errors of the binding layer. The
//! matching format validator reports the same condition to the user first,
//! so a renderer only calls `get` on validated input.

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde_json::Value;

use crate::config::FormConfig;
use crate::error::BindingError;

/// Native representation of `date` values.
pub const ISO_DATE: &str = "%Y-%m-%d";
/// Native representation of `date-time` values.
pub const ISO_DATETIME: &str = "%Y-%m-%dT%H:%M:%S";

/// A typed scalar value held by an input field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TypedValue {
    Integer(i64),
    Number(f64),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Path(PathBuf),
}

impl TypedValue {
    /// Native JSON form of the value.
    pub fn to_native(&self) -> Value {
        match self {
            Self::Integer(n) => Value::from(*n),
            Self::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Self::Text(s) => Value::String(s.clone()),
            Self::Date(d) => Value::String(d.format(ISO_DATE).to_string()),
            Self::DateTime(dt) => Value::String(dt.format(ISO_DATETIME).to_string()),
            Self::Path(p) => Value::String(p.to_string_lossy().into_owned()),
        }
    }
}

/// A getter/setter pair for one field format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Coercion {
    Integer,
    Number,
    Date { pattern: String },
    DateTime { pattern: String },
    Path,
    Identity,
}

impl Coercion {
    /// Pick the coercion for a field from its format, then its schema type.
    pub fn for_field(schema_type: &str, format: Option<&str>, config: &FormConfig) -> Self {
        let by_format = match format {
            Some("date") => Some(Self::Date {
                pattern: config.date_format.clone(),
            }),
            Some("date-time") => Some(Self::DateTime {
                pattern: config.datetime_format.clone(),
            }),
            Some("path" | "file-path" | "directory-path") => Some(Self::Path),
            _ => None,
        };
        by_format.unwrap_or(match schema_type {
            "integer" => Self::Integer,
            "number" => Self::Number,
            _ => Self::Identity,
        })
    }

    /// Name of the typed representation, used in error messages.
    pub fn target(&self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Date { .. } => "date",
            Self::DateTime { .. } => "date-time",
            Self::Path => "path",
            Self::Identity => "text",
        }
    }

    /// Getter: editable text to typed value. Empty text is `None`.
    pub fn get(&self, raw: &str) -> Result<Option<TypedValue>, BindingError> {
        if raw.is_empty() {
            return Ok(None);
        }
        let value = match self {
            Self::Integer => raw
                .trim()
                .parse::<i64>()
                .map(TypedValue::Integer)
                .map_err(|e| BindingError::parse(raw, self.target(), e))?,
            Self::Number => {
                let n = raw
                    .trim()
                    .parse::<f64>()
                    .map_err(|e| BindingError::parse(raw, self.target(), e))?;
                if !n.is_finite() {
                    return Err(BindingError::parse(raw, self.target(), "not a finite number"));
                }
                TypedValue::Number(n)
            }
            Self::Date { pattern } => NaiveDate::parse_from_str(raw, pattern)
                .map(TypedValue::Date)
                .map_err(|e| BindingError::parse(raw, self.target(), e))?,
            Self::DateTime { pattern } => NaiveDateTime::parse_from_str(raw, pattern)
                .map(TypedValue::DateTime)
                .map_err(|e| BindingError::parse(raw, self.target(), e))?,
            Self::Path => TypedValue::Path(PathBuf::from(raw)),
            Self::Identity => TypedValue::Text(raw.to_string()),
        };
        Ok(Some(value))
    }

    /// Setter: typed value to editable text. `None` is the empty string.
    ///
    /// The output is always accepted by [`Coercion::get`] for the same
    /// coercion and typed value kind.
    pub fn set(&self, value: Option<&TypedValue>) -> String {
        let Some(value) = value else {
            return String::new();
        };
        match (self, value) {
            (Self::Date { pattern }, TypedValue::Date(d)) => d.format(pattern).to_string(),
            (Self::Date { pattern }, TypedValue::DateTime(dt)) => dt.date().format(pattern).to_string(),
            (Self::DateTime { pattern }, TypedValue::DateTime(dt)) => dt.format(pattern).to_string(),
            (Self::DateTime { pattern }, TypedValue::Date(d)) => d
                .and_hms_opt(0, 0, 0)
                .map(|dt| dt.format(pattern).to_string())
                .unwrap_or_default(),
            (_, TypedValue::Integer(n)) => n.to_string(),
            (_, TypedValue::Number(n)) => n.to_string(),
            (_, TypedValue::Text(s)) => s.clone(),
            (_, TypedValue::Path(p)) => p.to_string_lossy().into_owned(),
            (_, TypedValue::Date(d)) => d.format(ISO_DATE).to_string(),
            (_, TypedValue::DateTime(dt)) => dt.format(ISO_DATETIME).to_string(),
        }
    }

    /// Read a native JSON value into a typed value. `null` is `None`.
    ///
    /// `field` names the field in shape errors.
    pub fn from_native(&self, field: &str, native: &Value) -> Result<Option<TypedValue>, BindingError> {
        if native.is_null() {
            return Ok(None);
        }
        let value = match self {
            Self::Integer => native
                .as_i64()
                .map(TypedValue::Integer)
                .ok_or_else(|| BindingError::shape(field, "an integer", native))?,
            Self::Number => native
                .as_f64()
                .map(TypedValue::Number)
                .ok_or_else(|| BindingError::shape(field, "a number", native))?,
            Self::Date { .. } => {
                let text = native_str(field, "an ISO date string", native)?;
                text.parse::<NaiveDate>()
                    .map(TypedValue::Date)
                    .map_err(|e| BindingError::parse(text, "ISO date", e))?
            }
            Self::DateTime { .. } => {
                let text = native_str(field, "an ISO date-time string", native)?;
                text.parse::<NaiveDateTime>()
                    .map(TypedValue::DateTime)
                    .map_err(|e| BindingError::parse(text, "ISO date-time", e))?
            }
            Self::Path => TypedValue::Path(PathBuf::from(native_str(field, "a path string", native)?)),
            Self::Identity => match native {
                Value::String(s) => TypedValue::Text(s.clone()),
                Value::Number(n) => TypedValue::Text(n.to_string()),
                Value::Bool(b) => TypedValue::Text(b.to_string()),
                other => return Err(BindingError::shape(field, "a string", other)),
            },
        };
        Ok(Some(value))
    }

    /// Native JSON value straight to editable text.
    pub fn native_to_text(&self, field: &str, native: &Value) -> Result<String, BindingError> {
        let typed = self.from_native(field, native)?;
        Ok(self.set(typed.as_ref()))
    }

    /// Editable text straight to a native JSON value. Empty text is `null`.
    pub fn text_to_native(&self, raw: &str) -> Result<Value, BindingError> {
        Ok(self
            .get(raw)?
            .map(|typed| typed.to_native())
            .unwrap_or(Value::Null))
    }
}

fn native_str<'a>(field: &str, expected: &str, native: &'a Value) -> Result<&'a str, BindingError> {
    native
        .as_str()
        .ok_or_else(|| BindingError::shape(field, expected, native))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::validator::Validator;
    use proptest::prelude::*;

    fn any_date() -> impl Strategy<Value = NaiveDate> {
        (1000i32..9999, 1u32..=365).prop_filter_map("valid ordinal", |(y, o)| NaiveDate::from_yo_opt(y, o))
    }

    proptest! {
        /// Setter output parses back to the same date and passes the date validator.
        #[test]
        fn date_round_trip(date in any_date()) {
            let config = FormConfig::default();
            let c = Coercion::for_field("string", Some("date"), &config);
            let text = c.set(Some(&TypedValue::Date(date)));
            prop_assert_eq!(c.get(&text).unwrap(), Some(TypedValue::Date(date)));
            let v = Validator::for_format("date", &config, false).unwrap();
            prop_assert!(v.check(&text).is_ok());
        }

        /// Minute-precision date-times survive set/get unchanged.
        #[test]
        fn datetime_round_trip(date in any_date(), h in 0u32..24, m in 0u32..60) {
            let config = FormConfig::default();
            let c = Coercion::for_field("string", Some("date-time"), &config);
            let dt = date.and_hms_opt(h, m, 0).unwrap();
            let text = c.set(Some(&TypedValue::DateTime(dt)));
            prop_assert_eq!(c.get(&text).unwrap(), Some(TypedValue::DateTime(dt)));
            prop_assert_eq!(c.set(c.get(&text).unwrap().as_ref()), text);
        }

        #[test]
        fn integer_round_trip(n in any::<i64>()) {
            let text = Coercion::Integer.set(Some(&TypedValue::Integer(n)));
            prop_assert_eq!(Coercion::Integer.get(&text).unwrap(), Some(TypedValue::Integer(n)));
            prop_assert!(Validator::Integer.check(&text).is_ok());
        }

        #[test]
        fn number_round_trip(n in proptest::num::f64::NORMAL | proptest::num::f64::ZERO) {
            let text = Coercion::Number.set(Some(&TypedValue::Number(n)));
            prop_assert_eq!(Coercion::Number.get(&text).unwrap(), Some(TypedValue::Number(n)));
        }

        #[test]
        fn path_round_trip(raw in "/[a-zA-Z0-9_./-]{1,40}") {
            let typed = Coercion::Path.get(&raw).unwrap();
            prop_assert_eq!(Coercion::Path.set(typed.as_ref()), raw);
        }
    }
}
