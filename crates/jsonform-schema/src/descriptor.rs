//! # Field Descriptors
//!
//! The compiled, immutable representation of one schema node. Every
//! descriptor carries the common header (type, name, label, description,
//! requiredness), the typed attributes extracted from its schema, its
//! declared validators and its variant-specific children.
//!
//! Descriptors are built once by the converters in [`crate::fields`] and
//! never change afterwards; all accessors take `&self`.

use std::fmt;

use indexmap::IndexMap;
use regex::Regex;
use serde::{Serialize, Serializer};
use serde_json::Value;

use jsonform_core::validator::{self, EMPTY_MESSAGE};
use jsonform_core::{Coercion, Failure, NumberRange, ValidationResult, Validator};

use crate::context::CompileContext;
use crate::error::CompileError;
use crate::resolve::Schema;

/// Keys every variant ignores.
pub const COMMON_IGNORE: [&str; 7] = [
    "additionalProperties",
    "name",
    "type",
    "title",
    "description",
    "if",
    "then",
];

/// Boolean labels longer than this fall back to the title.
const SWITCH_LABEL_LIMIT: usize = 100;

/// The five field kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    Boolean,
    String,
    Number,
    Array,
    Object,
}

impl Variant {
    pub fn name(self) -> &'static str {
        match self {
            Self::Boolean => "Boolean",
            Self::String => "String",
            Self::Number => "Number",
            Self::Array => "Array",
            Self::Object => "Object",
        }
    }

    /// Schema types a descriptor of this variant may carry.
    pub fn supported_types(self) -> &'static [&'static str] {
        match self {
            Self::Boolean => &["boolean"],
            Self::String => &["string"],
            Self::Number => &["integer", "number"],
            Self::Array => &["array"],
            Self::Object => &["object"],
        }
    }

    /// Keys the variant extracts. `default` is allowed everywhere.
    pub fn allowed(self) -> &'static [&'static str] {
        match self {
            Self::Boolean => &["default"],
            Self::String => &["format", "pattern", "enum", "default"],
            Self::Number => &[
                "enum",
                "format",
                "minimum",
                "maximum",
                "exclusiveMinimum",
                "exclusiveMaximum",
                "default",
            ],
            Self::Array => &["items", "minItems", "maxItems", "default", "$defs"],
            Self::Object => &["required", "properties", "$defs", "default"],
        }
    }

    /// Keys the variant tolerates on top of [`COMMON_IGNORE`].
    pub fn extra_ignored(self) -> &'static [&'static str] {
        match self {
            Self::String => &["minLength", "maxLength", "writeOnly"],
            Self::Object => &["properties", "required", "$schema", "$id"],
            Self::Boolean | Self::Number | Self::Array => &[],
        }
    }

    pub fn accepts_key(self, key: &str) -> bool {
        COMMON_IGNORE.contains(&key) || self.allowed().contains(&key) || self.extra_ignored().contains(&key)
    }

    /// Reject any schema key outside the ignore and allow lists.
    pub fn check_keys(self, field: &str, schema: &Schema) -> Result<(), CompileError> {
        let mut illegal: Vec<String> = schema
            .keys()
            .filter(|key| !self.accepts_key(key))
            .cloned()
            .collect();
        if illegal.is_empty() {
            return Ok(());
        }
        illegal.sort();
        Err(CompileError::UnsupportedAttribute {
            variant: self.name(),
            field: field.to_string(),
            keys: illegal,
        })
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A compiled `pattern` restricting what may be typed into a field.
///
/// The whole text must match.
#[derive(Debug, Clone)]
pub struct Restrict {
    source: String,
    regex: Regex,
}

impl Restrict {
    pub fn compile(field: &str, pattern: &str) -> Result<Self, CompileError> {
        let regex = Regex::new(&format!("^(?:{pattern})$")).map_err(|e| {
            CompileError::combination(field, format!("invalid pattern {pattern:?}: {e}"))
        })?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// The pattern as written in the schema.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl PartialEq for Restrict {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Serialize for Restrict {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

/// Typed attributes extracted from a schema node.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FieldAttrs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Enumerated values, as the strings a select offers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<String>>,
    /// Offer `choices` as suggestions for free text instead of a closed
    /// select.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub suggester: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restrict: Option<Restrict>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub password: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<NumberRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
}

impl FieldAttrs {
    /// Attributes holding only the schema's `default`.
    pub fn with_default(schema: &Schema) -> Self {
        Self {
            default: schema.get("default").cloned(),
            ..Self::default()
        }
    }
}

/// The header every descriptor shares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldHeader {
    pub schema_type: String,
    pub field_name: String,
    pub label: String,
    pub description: String,
    pub required: bool,
}

impl FieldHeader {
    /// Read `type`, `title` and `description` from `schema`.
    pub fn from_schema(field: &str, field_name: &str, required: bool, schema: &Schema) -> Result<Self, CompileError> {
        let schema_type = match schema.get("type") {
            Some(Value::String(t)) => t.clone(),
            Some(other) => return Err(CompileError::invalid(field, format!("'type' must be a string, got {other}"))),
            None => return Err(CompileError::missing(field, "type")),
        };
        Ok(Self {
            schema_type,
            field_name: field_name.to_string(),
            label: text_key(field, schema, "title")?,
            description: text_key(field, schema, "description")?,
            required,
        })
    }
}

fn text_key(field: &str, schema: &Schema, key: &str) -> Result<String, CompileError> {
    match schema.get(key) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(CompileError::invalid(field, format!("'{key}' must be a string, got {other}"))),
    }
}

/// Variant-specific part of a descriptor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum FieldKind {
    Boolean,
    String,
    Number,
    /// One descriptor shared by every element.
    Array { subfield: Box<FieldDescriptor> },
    /// Children in `properties` order.
    Object { fields: IndexMap<String, FieldDescriptor> },
}

impl FieldKind {
    pub fn variant(&self) -> Variant {
        match self {
            Self::Boolean => Variant::Boolean,
            Self::String => Variant::String,
            Self::Number => Variant::Number,
            Self::Array { .. } => Variant::Array,
            Self::Object { .. } => Variant::Object,
        }
    }
}

/// One compiled schema node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDescriptor {
    #[serde(rename = "type")]
    schema_type: String,
    field_name: String,
    label: String,
    description: String,
    required: bool,
    blank_allowed: bool,
    attrs: FieldAttrs,
    validators: Vec<Validator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    format_validator: Option<Validator>,
    coercion: Coercion,
    #[serde(flatten)]
    kind: FieldKind,
}

impl FieldDescriptor {
    /// Assemble a descriptor, rejecting a `type` outside the variant's
    /// supported set.
    ///
    /// Derives blank handling, the format validator and the value coercion
    /// from the header and attributes under the context's configuration.
    pub fn new(
        ctx: &CompileContext<'_>,
        header: FieldHeader,
        attrs: FieldAttrs,
        validators: Vec<Validator>,
        kind: FieldKind,
    ) -> Result<Self, CompileError> {
        let variant = kind.variant();
        if !variant.supported_types().contains(&header.schema_type.as_str()) {
            return Err(CompileError::UnsupportedType {
                variant: variant.name(),
                field: ctx.location(&header.field_name).to_string(),
                schema_type: header.schema_type,
            });
        }
        let config = ctx.config();
        let blank_allowed = !(header.required || attrs.default.as_ref().is_some_and(is_truthy));
        let format_validator = match variant {
            Variant::String | Variant::Number => attrs
                .format
                .as_deref()
                .and_then(|format| Validator::for_format(format, config, blank_allowed)),
            _ => None,
        };
        let coercion = Coercion::for_field(&header.schema_type, attrs.format.as_deref(), config);
        Ok(Self {
            schema_type: header.schema_type,
            field_name: header.field_name,
            label: header.label,
            description: header.description,
            required: header.required,
            blank_allowed,
            attrs,
            validators,
            format_validator,
            coercion,
            kind,
        })
    }

    pub fn schema_type(&self) -> &str {
        &self.schema_type
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// The schema `title`, empty when absent.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn required(&self) -> bool {
        self.required
    }

    pub fn attrs(&self) -> &FieldAttrs {
        &self.attrs
    }

    /// Validators derived from the schema constraints.
    pub fn validators(&self) -> &[Validator] {
        &self.validators
    }

    /// The validator for the field's `format`, if the format has one.
    pub fn format_validator(&self) -> Option<&Validator> {
        self.format_validator.as_ref()
    }

    pub fn coercion(&self) -> &Coercion {
        &self.coercion
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn variant(&self) -> Variant {
        self.kind.variant()
    }

    pub fn default(&self) -> Option<&Value> {
        self.attrs.default.as_ref()
    }

    pub fn format(&self) -> Option<&str> {
        self.attrs.format.as_deref()
    }

    /// Whether an empty value is valid: not required and no truthy default.
    pub fn blank_allowed(&self) -> bool {
        self.blank_allowed
    }

    /// Children of an Object descriptor.
    pub fn fields(&self) -> Option<&IndexMap<String, FieldDescriptor>> {
        match &self.kind {
            FieldKind::Object { fields } => Some(fields),
            _ => None,
        }
    }

    /// Element descriptor of an Array descriptor.
    pub fn subfield(&self) -> Option<&FieldDescriptor> {
        match &self.kind {
            FieldKind::Array { subfield } => Some(subfield),
            _ => None,
        }
    }

    /// Enumerated values: the field's own, or its elements' for arrays.
    pub fn choices(&self) -> Option<&[String]> {
        match &self.kind {
            FieldKind::Array { subfield } => subfield.attrs.choices.as_deref(),
            _ => self.attrs.choices.as_deref(),
        }
    }

    /// Whether the field renders as a closed select.
    pub fn is_select(&self) -> bool {
        self.variant() == Variant::String && self.attrs.choices.is_some() && !self.attrs.suggester
    }

    /// Label shown next to the widget. Switches prefer a short description.
    pub fn display_label(&self) -> &str {
        if self.variant() == Variant::Boolean
            && !self.description.is_empty()
            && self.description.chars().count() < SWITCH_LABEL_LIMIT
        {
            &self.description
        } else {
            &self.label
        }
    }

    /// Every validator an input runs, in order: the non-empty check when
    /// nothing else is declared and blanks are not allowed, the declared
    /// validators, then the format validator.
    pub fn effective_validators(&self) -> Vec<Validator> {
        let mut all = Vec::with_capacity(self.validators.len() + 2);
        if self.validators.is_empty() && !self.blank_allowed {
            all.push(Validator::NotEmpty);
        }
        all.extend(self.validators.iter().cloned());
        all.extend(self.format_validator.iter().cloned());
        all
    }

    /// Validate the editable text of a scalar field.
    ///
    /// Blank text is valid without running anything when blanks are allowed.
    /// Filesystem formats are checked afresh on every call.
    pub fn check_text(&self, raw: &str) -> ValidationResult {
        if raw.is_empty() && self.blank_allowed {
            return ValidationResult::valid();
        }
        let mut result = validator::validate_all(&self.effective_validators(), raw);
        if raw.is_empty() {
            return result;
        }
        if let Some(restrict) = &self.attrs.restrict {
            if !restrict.is_match(raw) {
                result.push(Failure {
                    validator: "pattern",
                    message: format!("Must match pattern '{}'", restrict.as_str()),
                });
            }
        }
        if let Some(max) = self.attrs.max_length {
            if raw.chars().count() > max {
                result.push(Failure {
                    validator: "max_length",
                    message: format!("Must be at most {max} characters"),
                });
            }
        }
        if self.is_select() {
            if let Some(choices) = &self.attrs.choices {
                if !choices.iter().any(|c| c == raw) {
                    result.push(Failure {
                        validator: "choice",
                        message: format!("Must be one of: {}", choices.join(", ")),
                    });
                }
            }
        }
        result
    }

    /// The default as editable text, empty when there is none.
    pub fn default_text(&self) -> String {
        match &self.attrs.default {
            None | Some(Value::Null) => String::new(),
            Some(default) => self
                .coercion
                .native_to_text(&self.field_name, default)
                .unwrap_or_else(|_| scalar_text(default)),
        }
    }
}

/// The not-empty message, for callers that report blank required fields
/// outside [`FieldDescriptor::check_text`].
pub fn empty_failure() -> Failure {
    Failure {
        validator: "not_empty",
        message: EMPTY_MESSAGE.to_string(),
    }
}

/// JSON truthiness: `null`, `false`, `0`, `""`, `[]` and `{}` are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// A scalar JSON value as plain text; strings are not quoted.
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
