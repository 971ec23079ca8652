//! # Field Validators
//!
//! A [`Validator`] is a predicate over the raw (editable) text of a field
//! plus the message shown when it fails. Validators are composed into an
//! ordered list per field; [`validate_all`] runs every validator in the list
//! and collects all failures rather than stopping at the first.
//!
//! ## Filesystem formats
//!
//! `file-path`, `directory-path` and `path` validators check the filesystem
//! on every call. A file can appear or disappear between two checks, so
//! callers must not cache their outcome (see
//! [`Validator::touches_filesystem`]).

use std::fmt::Write as _;
use std::path::{Component, Path};

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::config::FormConfig;

/// Message of the non-empty validator.
pub const EMPTY_MESSAGE: &str = "Field can not be empty";
const NOT_A_NUMBER: &str = "Must be a valid number.";
const NOT_AN_INTEGER: &str = "Must be a valid integer.";

/// A single validation rule for the raw text of a field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Validator {
    /// Rejects the empty string.
    NotEmpty,
    /// Accepts text that parses as an integer.
    Integer,
    /// Accepts text that parses as a finite number.
    Number,
    /// Accepts numbers within inclusive and exclusive bounds.
    Range(NumberRange),
    /// Accepts text that parses as a date under `pattern`.
    Date { pattern: String, allow_blank: bool },
    /// Accepts text that parses as a date-time under `pattern`.
    DateTime { pattern: String, allow_blank: bool },
    /// Accepts paths naming an existing regular file.
    FilePath { allow_blank: bool },
    /// Accepts paths naming an existing directory.
    DirectoryPath { allow_blank: bool },
    /// Accepts absolute paths or paths starting with `~`.
    AbsolutePath { allow_blank: bool },
}

impl Validator {
    /// The format validator for a string `format`, if that format has one.
    ///
    /// `allow_blank` decides whether the empty string passes.
    pub fn for_format(format: &str, config: &FormConfig, allow_blank: bool) -> Option<Self> {
        match format {
            "date" => Some(Self::Date {
                pattern: config.date_format.clone(),
                allow_blank,
            }),
            "date-time" => Some(Self::DateTime {
                pattern: config.datetime_format.clone(),
                allow_blank,
            }),
            "file-path" => Some(Self::FilePath { allow_blank }),
            "directory-path" => Some(Self::DirectoryPath { allow_blank }),
            "path" => Some(Self::AbsolutePath { allow_blank }),
            _ => None,
        }
    }

    /// Stable name of the rule, as serialized in the `kind` tag.
    pub fn name(&self) -> &'static str {
        match self {
            Self::NotEmpty => "not_empty",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Range(_) => "range",
            Self::Date { .. } => "date",
            Self::DateTime { .. } => "date_time",
            Self::FilePath { .. } => "file_path",
            Self::DirectoryPath { .. } => "directory_path",
            Self::AbsolutePath { .. } => "absolute_path",
        }
    }

    /// Whether the outcome depends on filesystem state and must be
    /// re-evaluated on every check.
    pub fn touches_filesystem(&self) -> bool {
        matches!(
            self,
            Self::FilePath { .. } | Self::DirectoryPath { .. } | Self::AbsolutePath { .. }
        )
    }

    /// Run the rule against `value`.
    pub fn check(&self, value: &str) -> Result<(), Failure> {
        let ok = match self {
            Self::NotEmpty => not_empty(value),
            Self::Integer => return check_integer(value).map_err(|msg| self.fail(msg)),
            Self::Number => return parse_number(value).map(|_| ()).map_err(|msg| self.fail(msg)),
            Self::Range(range) => {
                let number = parse_number(value).map_err(|msg| self.fail(msg))?;
                range.contains(number)
            }
            Self::Date {
                pattern,
                allow_blank,
            } => valid_date_by_format(value, pattern, *allow_blank),
            Self::DateTime {
                pattern,
                allow_blank,
            } => valid_datetime_by_format(value, pattern, *allow_blank),
            Self::FilePath { allow_blank } => valid_file_path(value, *allow_blank),
            Self::DirectoryPath { allow_blank } => valid_folder(value, *allow_blank),
            Self::AbsolutePath { allow_blank } => is_absolute_path(value, *allow_blank),
        };
        if ok {
            Ok(())
        } else {
            Err(self.fail(self.describe_failure()))
        }
    }

    /// The message shown when the rule rejects a well-formed value.
    pub fn describe_failure(&self) -> String {
        match self {
            Self::NotEmpty => EMPTY_MESSAGE.to_string(),
            Self::Integer => NOT_AN_INTEGER.to_string(),
            Self::Number => NOT_A_NUMBER.to_string(),
            Self::Range(range) => range.describe_failure(),
            Self::Date { pattern, .. } | Self::DateTime { pattern, .. } => {
                format!("Is not a valid date of format '{}'", example_date(pattern))
            }
            Self::FilePath { .. } => "File does not exist".to_string(),
            Self::DirectoryPath { .. } => "Directory does not exist".to_string(),
            Self::AbsolutePath { .. } => {
                "Use absolute paths or '~' to expand the current user".to_string()
            }
        }
    }

    fn fail(&self, message: impl Into<String>) -> Failure {
        Failure {
            validator: self.name(),
            message: message.into(),
        }
    }
}

/// Numeric bounds as they appear in JSON Schema.
///
/// Inclusive bounds are checked first; exclusive bounds then reject values
/// `<= exclusive_minimum` or `>= exclusive_maximum`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct NumberRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<f64>,
}

impl NumberRange {
    /// Bounds with only inclusive limits.
    pub fn inclusive(minimum: Option<f64>, maximum: Option<f64>) -> Self {
        Self {
            minimum,
            maximum,
            ..Self::default()
        }
    }

    /// Bounds with only exclusive limits.
    pub fn exclusive(exclusive_minimum: Option<f64>, exclusive_maximum: Option<f64>) -> Self {
        Self {
            exclusive_minimum,
            exclusive_maximum,
            ..Self::default()
        }
    }

    /// True when no bound is set.
    pub fn is_unbounded(&self) -> bool {
        self.minimum.is_none()
            && self.maximum.is_none()
            && self.exclusive_minimum.is_none()
            && self.exclusive_maximum.is_none()
    }

    /// Whether `value` satisfies every bound.
    pub fn contains(&self, value: f64) -> bool {
        if self.minimum.is_some_and(|min| value < min) || self.maximum.is_some_and(|max| value > max) {
            return false;
        }
        if self.exclusive_minimum.is_some_and(|min| value <= min) {
            return false;
        }
        if self.exclusive_maximum.is_some_and(|max| value >= max) {
            return false;
        }
        true
    }

    /// Message for an out-of-range value, naming exactly the bounds present.
    pub fn describe_failure(&self) -> String {
        let b = format_bound;
        match (
            self.minimum,
            self.maximum,
            self.exclusive_minimum,
            self.exclusive_maximum,
        ) {
            (_, _, Some(ex_min), Some(ex_max)) => {
                format!("Must be greater than {} and smaller than {}", b(ex_min), b(ex_max))
            }
            (_, Some(max), Some(ex_min), None) => format!(
                "Must be greater than {} and smaller or equal to {}",
                b(ex_min),
                b(max)
            ),
            (_, None, Some(ex_min), None) => format!("Must be greater than {}", b(ex_min)),
            (None, _, None, Some(ex_max)) => format!("Must be smaller than {}", b(ex_max)),
            (Some(min), _, None, Some(ex_max)) => format!(
                "Must be greater or equal {} and smaller than {}",
                b(min),
                b(ex_max)
            ),
            (Some(min), Some(max), None, None) => {
                format!("Must be between {} and {}.", b(min), b(max))
            }
            (Some(min), None, None, None) => {
                format!("Must be greater than or equal to {}.", b(min))
            }
            (None, Some(max), None, None) => format!("Must be less than or equal to {}.", b(max)),
            (None, None, None, None) => "Value out of range.".to_string(),
        }
    }
}

/// Render a bound without a trailing `.0` when it is integral.
fn format_bound(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// A rejected value: which rule failed and what to tell the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    /// Name of the failing validator.
    pub validator: &'static str,
    /// User-facing message.
    pub message: String,
}

/// The outcome of running a list of validators.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    failures: Vec<Failure>,
}

impl ValidationResult {
    /// A passing result.
    pub fn valid() -> Self {
        Self::default()
    }

    /// True when no validator failed.
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }

    /// All failures in validator order.
    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    /// The failure messages in validator order.
    pub fn messages(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.message.as_str()).collect()
    }

    /// Record an additional failure.
    pub fn push(&mut self, failure: Failure) {
        self.failures.push(failure);
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_failures(self) -> Vec<Failure> {
        self.failures
    }
}

/// Run every validator against `value` and collect all failures.
pub fn validate_all(validators: &[Validator], value: &str) -> ValidationResult {
    let mut result = ValidationResult::valid();
    for validator in validators {
        if let Err(failure) = validator.check(value) {
            tracing::trace!(validator = failure.validator, message = %failure.message, "validation failed");
            result.push(failure);
        }
    }
    result
}

/// The validator added when blank values are not allowed.
pub fn not_empty(value: &str) -> bool {
    !value.is_empty()
}

fn parse_number(value: &str) -> Result<f64, &'static str> {
    match value.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(n),
        _ => Err(NOT_A_NUMBER),
    }
}

fn check_integer(value: &str) -> Result<(), &'static str> {
    parse_number(value)?;
    value
        .trim()
        .parse::<i64>()
        .map(|_| ())
        .map_err(|_| NOT_AN_INTEGER)
}

/// Whether `value` parses as a date under the strftime `pattern`.
pub fn valid_date_by_format(value: &str, pattern: &str, valid_empty: bool) -> bool {
    if value.is_empty() {
        return valid_empty;
    }
    NaiveDate::parse_from_str(value, pattern).is_ok()
}

/// Whether `value` parses as a date-time under the strftime `pattern`.
pub fn valid_datetime_by_format(value: &str, pattern: &str, valid_empty: bool) -> bool {
    if value.is_empty() {
        return valid_empty;
    }
    NaiveDateTime::parse_from_str(value, pattern).is_ok()
}

/// Today's date rendered with `pattern`, used as an example in messages.
///
/// Falls back to the pattern itself when it cannot be rendered.
pub fn example_date(pattern: &str) -> String {
    let mut out = String::new();
    match write!(out, "{}", chrono::Local::now().format(pattern)) {
        Ok(()) => out,
        Err(_) => pattern.to_string(),
    }
}

/// Whether `value` names an existing regular file. Not cached.
pub fn valid_file_path(value: &str, valid_empty: bool) -> bool {
    if value.is_empty() {
        return valid_empty;
    }
    Path::new(value).is_file()
}

/// Whether `value` names an existing directory. Not cached.
pub fn valid_folder(value: &str, valid_empty: bool) -> bool {
    if value.is_empty() {
        return valid_empty;
    }
    Path::new(value).is_dir()
}

/// Whether `value` is an absolute path, or starts with `~` and the home
/// directory of the current user is known.
///
/// Relative paths and paths with `.` or `..` components are rejected.
pub fn is_absolute_path(value: &str, valid_empty: bool) -> bool {
    if value.is_empty() {
        return valid_empty;
    }
    if value == "~" || value.starts_with("~/") {
        return dirs::home_dir().is_some();
    }
    let path = Path::new(value);
    path.is_absolute()
        && path
            .components()
            .all(|c| !matches!(c, Component::CurDir | Component::ParentDir))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(
        minimum: Option<f64>,
        maximum: Option<f64>,
        exclusive_minimum: Option<f64>,
        exclusive_maximum: Option<f64>,
    ) -> NumberRange {
        NumberRange {
            minimum,
            maximum,
            exclusive_minimum,
            exclusive_maximum,
        }
    }

    #[test]
    fn inclusive_range_bounds() {
        let v = Validator::Range(NumberRange::inclusive(Some(10.0), Some(115.0)));
        assert!(v.check("9").is_err());
        assert!(v.check("116").is_err());
        assert!(v.check("10").is_ok());
        assert!(v.check("115").is_ok());
    }

    #[test]
    fn exclusive_range_bounds() {
        let v = Validator::Range(NumberRange::exclusive(Some(10.0), Some(115.0)));
        assert!(v.check("10").is_err());
        assert!(v.check("115").is_err());
        for n in 11..=114 {
            assert!(v.check(&n.to_string()).is_ok(), "{n} should pass");
        }
    }

    #[test]
    fn range_messages_cover_every_combination() {
        let cases = [
            (range(None, None, Some(1.0), Some(5.0)), "Must be greater than 1 and smaller than 5"),
            (
                range(None, Some(5.0), Some(1.0), None),
                "Must be greater than 1 and smaller or equal to 5",
            ),
            (range(None, None, Some(1.0), None), "Must be greater than 1"),
            (range(None, None, None, Some(5.0)), "Must be smaller than 5"),
            (
                range(Some(1.0), None, None, Some(5.0)),
                "Must be greater or equal 1 and smaller than 5",
            ),
            (range(Some(1.0), Some(5.0), None, None), "Must be between 1 and 5."),
            (range(Some(1.0), None, None, None), "Must be greater than or equal to 1."),
            (range(None, Some(5.0), None, None), "Must be less than or equal to 5."),
        ];
        for (r, expected) in cases {
            assert_eq!(r.describe_failure(), expected);
        }
    }

    #[test]
    fn fractional_bounds_keep_decimals() {
        let r = range(Some(0.5), None, None, None);
        assert_eq!(r.describe_failure(), "Must be greater than or equal to 0.5.");
    }

    #[test]
    fn range_rejects_non_numbers() {
        let v = Validator::Range(NumberRange::inclusive(Some(0.0), None));
        let failure = v.check("abc").unwrap_err();
        assert_eq!(failure.message, "Must be a valid number.");
        assert_eq!(failure.validator, "range");
    }

    #[test]
    fn integer_validator() {
        assert!(Validator::Integer.check("42").is_ok());
        assert!(Validator::Integer.check("-7").is_ok());
        assert_eq!(Validator::Integer.check("4.5").unwrap_err().message, "Must be a valid integer.");
        assert_eq!(Validator::Integer.check("x").unwrap_err().message, "Must be a valid number.");
        assert!(Validator::Integer.check("").is_err());
    }

    #[test]
    fn number_validator_rejects_non_finite() {
        assert!(Validator::Number.check("0.1").is_ok());
        assert!(Validator::Number.check("inf").is_err());
        assert!(Validator::Number.check("NaN").is_err());
    }

    #[test]
    fn not_empty_validator() {
        assert!(Validator::NotEmpty.check("a").is_ok());
        assert_eq!(Validator::NotEmpty.check("").unwrap_err().message, EMPTY_MESSAGE);
    }

    #[test]
    fn date_validator_uses_pattern() {
        let v = Validator::for_format("date", &FormConfig::default(), false).unwrap();
        assert!(v.check("24.12.2023").is_ok());
        assert!(v.check("2023-12-24").is_err());
        assert!(v.check("").is_err());
        let message = v.check("31.02.2023").unwrap_err().message;
        assert!(message.starts_with("Is not a valid date of format '"));
    }

    #[test]
    fn datetime_validator_uses_pattern() {
        let v = Validator::for_format("date-time", &FormConfig::default(), true).unwrap();
        assert!(v.check("24.12.2023 18:30").is_ok());
        assert!(v.check("24.12.2023").is_err());
        assert!(v.check("").is_ok());
    }

    #[test]
    fn file_and_folder_validators_hit_the_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("foo");
        let file_str = file.to_str().unwrap();
        let dir_str = dir.path().to_str().unwrap();

        let file_v = Validator::FilePath { allow_blank: false };
        assert!(file_v.check(file_str).is_err());
        std::fs::write(&file, "foo").unwrap();
        assert!(file_v.check(file_str).is_ok());
        assert!(file_v.check(dir_str).is_err());

        let dir_v = Validator::DirectoryPath { allow_blank: true };
        assert!(dir_v.check(dir_str).is_ok());
        assert!(dir_v.check(file_str).is_err());
        assert!(dir_v.check("").is_ok());
        assert!(dir_v.touches_filesystem());
        assert!(!Validator::Integer.touches_filesystem());
    }

    #[test]
    fn absolute_path_validator() {
        assert!(!is_absolute_path(".", false));
        assert!(!is_absolute_path("relative/dir", false));
        assert!(!is_absolute_path("/usr/../etc", false));
        assert!(is_absolute_path("/usr/bin", false));
        assert!(is_absolute_path("", true));
        assert!(!is_absolute_path("", false));
        if dirs::home_dir().is_some() {
            assert!(is_absolute_path("~", false));
            assert!(is_absolute_path("~/projects", false));
        }
    }

    #[test]
    fn unknown_formats_have_no_validator() {
        let cfg = FormConfig::default();
        assert!(Validator::for_format("password", &cfg, false).is_none());
        assert!(Validator::for_format("email", &cfg, false).is_none());
    }

    #[test]
    fn validate_all_collects_every_failure() {
        let validators = [
            Validator::NotEmpty,
            Validator::DirectoryPath { allow_blank: false },
        ];
        let result = validate_all(&validators, "");
        assert!(!result.is_valid());
        assert_eq!(
            result.messages(),
            vec!["Field can not be empty", "Directory does not exist"]
        );
    }

    #[test]
    fn validators_serialize_with_kind_tag() {
        let v = Validator::Range(NumberRange::inclusive(Some(1.0), None));
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["kind"], "range");
        assert_eq!(json["minimum"], 1.0);
        assert!(json.get("maximum").is_none());
    }
}
