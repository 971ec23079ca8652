//! Form configuration.
//!
//! Controls how compiled fields present and parse their values. Defaults
//! match the day-first patterns used by the input widgets. Override via
//! environment variables, a YAML file loaded by the CLI, or explicit
//! construction.

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default pattern for `date` fields.
pub const DEFAULT_DATE_FORMAT: &str = "%d.%m.%Y";
/// Default pattern for `date-time` fields.
pub const DEFAULT_DATETIME_FORMAT: &str = "%d.%m.%Y %H:%M";
/// Default limit on nested object depth, which also bounds `$ref` cycles.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Settings shared by compilation, widget options and data binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormConfig {
    /// strftime pattern used to edit `date` values.
    pub date_format: String,
    /// strftime pattern used to edit `date-time` values.
    pub datetime_format: String,
    /// Render string enums as free text with suggestions instead of a
    /// closed select.
    pub enum_suggester: bool,
    /// Maximum object nesting depth accepted by the compiler.
    pub max_depth: usize,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            datetime_format: DEFAULT_DATETIME_FORMAT.to_string(),
            enum_suggester: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl FormConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `JSONFORM_DATE_FORMAT` (default: `%d.%m.%Y`)
    /// - `JSONFORM_DATETIME_FORMAT` (default: `%d.%m.%Y %H:%M`)
    /// - `JSONFORM_ENUM_SUGGESTER` (`true`/`false`, default: `false`)
    /// - `JSONFORM_MAX_DEPTH` (default: 32)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(fmt) = lookup("JSONFORM_DATE_FORMAT") {
            config.date_format = fmt;
        }
        if let Some(fmt) = lookup("JSONFORM_DATETIME_FORMAT") {
            config.datetime_format = fmt;
        }
        if let Some(raw) = lookup("JSONFORM_ENUM_SUGGESTER") {
            config.enum_suggester = parse_flag("JSONFORM_ENUM_SUGGESTER", &raw)?;
        }
        if let Some(raw) = lookup("JSONFORM_MAX_DEPTH") {
            config.max_depth =
                raw.trim()
                    .parse()
                    .map_err(|e: std::num::ParseIntError| ConfigError::InvalidValue {
                        var: "JSONFORM_MAX_DEPTH".to_string(),
                        value: raw.clone(),
                        reason: e.to_string(),
                    })?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Check that both patterns are valid strftime patterns and the depth
    /// limit is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_valid_pattern(&self.date_format) {
            return Err(ConfigError::InvalidPattern {
                name: "date",
                pattern: self.date_format.clone(),
            });
        }
        if !is_valid_pattern(&self.datetime_format) {
            return Err(ConfigError::InvalidPattern {
                name: "date-time",
                pattern: self.datetime_format.clone(),
            });
        }
        if self.max_depth == 0 {
            return Err(ConfigError::ZeroDepth);
        }
        Ok(())
    }
}

fn parse_flag(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            var: var.to_string(),
            value: raw.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}

fn is_valid_pattern(pattern: &str) -> bool {
    !pattern.is_empty() && !StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error))
}
