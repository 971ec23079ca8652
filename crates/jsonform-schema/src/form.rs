//! # Form Model & Data Exchange
//!
//! [`FormModel`] is the compiled root Object descriptor plus the
//! configuration it was compiled under. It is the entry point for a
//! renderer and for headless use (the CLI).
//!
//! ## Editable tree
//!
//! A renderer holds field state as a [`RawValue`] tree mirroring the
//! descriptor tree: `Text` for inputs, `Toggle` for switches, `Choice` and
//! `Choices` for selects, `List` for arrays and `Group` for objects. Native
//! JSON data moves in and out of that tree through each field's coercion:
//!
//! ```text
//!   native JSON --to_raw--> RawValue --validate_raw--> [FieldFailure]
//!   native JSON <-from_raw-- RawValue
//! ```
//!
//! Object keys missing from native data keep their initial value; `null`
//! clears a field; unknown keys are ignored. Validation never errors: it
//! returns failures keyed by dotted path, list indices in brackets.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use jsonform_core::{BindingError, FormConfig, ValidationResult};

use crate::context::CompileContext;
use crate::descriptor::{is_truthy, scalar_text, FieldDescriptor, FieldKind};
use crate::error::CompileError;
use crate::fields::object;
use crate::registry::{self, ConverterRegistry};

/// Editable state of one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RawValue {
    Text(String),
    Toggle(bool),
    Choice(Option<String>),
    Choices(Vec<String>),
    List(Vec<RawValue>),
    Group(IndexMap<String, RawValue>),
}

impl RawValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Toggle(_) => "toggle",
            Self::Choice(_) => "choice",
            Self::Choices(_) => "choices",
            Self::List(_) => "list",
            Self::Group(_) => "group",
        }
    }

    /// Child of a `Group` by name.
    pub fn get(&self, name: &str) -> Option<&RawValue> {
        match self {
            Self::Group(group) => group.get(name),
            _ => None,
        }
    }

    /// Mutable child of a `Group` by name.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut RawValue> {
        match self {
            Self::Group(group) => group.get_mut(name),
            _ => None,
        }
    }
}

/// One validation failure in a data tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldFailure {
    /// Dotted path of the field, `[i]` for list elements.
    pub path: String,
    /// Name of the failing rule.
    pub validator: &'static str,
    pub message: String,
}

impl FieldDescriptor {
    /// Editable tree holding the field's defaults.
    pub fn initial_raw(&self) -> Result<RawValue, BindingError> {
        match self.kind() {
            FieldKind::Boolean => Ok(RawValue::Toggle(self.default().is_some_and(is_truthy))),
            FieldKind::String if self.is_select() => Ok(RawValue::Choice(self.initial_choice())),
            FieldKind::String | FieldKind::Number => Ok(RawValue::Text(self.default_text())),
            FieldKind::Array { .. } => match self.default() {
                Some(default @ Value::Array(_)) => self.to_raw(default),
                _ => Ok(self.cleared_raw()),
            },
            FieldKind::Object { fields } => {
                let mut group = IndexMap::with_capacity(fields.len());
                for (name, field) in fields {
                    group.insert(name.clone(), field.initial_raw().map_err(|e| e.within(name))?);
                }
                if let Some(Value::Object(default)) = self.default() {
                    merge_native(fields, &mut group, default)?;
                }
                Ok(RawValue::Group(group))
            }
        }
    }

    /// Editable tree with every value cleared.
    pub fn cleared_raw(&self) -> RawValue {
        match self.kind() {
            FieldKind::Boolean => RawValue::Toggle(false),
            FieldKind::String if self.is_select() => RawValue::Choice(None),
            FieldKind::String | FieldKind::Number => RawValue::Text(String::new()),
            FieldKind::Array { .. } if self.choices().is_some() => RawValue::Choices(Vec::new()),
            FieldKind::Array { .. } => RawValue::List(Vec::new()),
            FieldKind::Object { fields } => RawValue::Group(
                fields
                    .iter()
                    .map(|(name, field)| (name.clone(), field.cleared_raw()))
                    .collect(),
            ),
        }
    }

    /// Write native data through the setters.
    pub fn to_raw(&self, native: &Value) -> Result<RawValue, BindingError> {
        if native.is_null() {
            return Ok(self.cleared_raw());
        }
        match self.kind() {
            FieldKind::Boolean => native
                .as_bool()
                .map(RawValue::Toggle)
                .ok_or_else(|| BindingError::shape("", "a boolean", native)),
            FieldKind::String if self.is_select() => match native {
                Value::String(_) | Value::Number(_) | Value::Bool(_) => Ok(RawValue::Choice(Some(scalar_text(native)))),
                other => Err(BindingError::shape("", "a string", other)),
            },
            FieldKind::String | FieldKind::Number => Ok(RawValue::Text(self.coercion().native_to_text("", native)?)),
            FieldKind::Array { subfield } => {
                let Value::Array(items) = native else {
                    return Err(BindingError::shape("", "an array", native));
                };
                if self.choices().is_some() {
                    let selected = items
                        .iter()
                        .enumerate()
                        .map(|(i, item)| match item {
                            Value::String(_) | Value::Number(_) | Value::Bool(_) => Ok(scalar_text(item)),
                            other => Err(BindingError::shape(format!("[{i}]"), "a string", other)),
                        })
                        .collect::<Result<Vec<_>, _>>()?;
                    return Ok(RawValue::Choices(selected));
                }
                let list = items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| subfield.to_raw(item).map_err(|e| e.within(&format!("[{i}]"))))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(RawValue::List(list))
            }
            FieldKind::Object { fields } => {
                let Value::Object(map) = native else {
                    return Err(BindingError::shape("", "an object", native));
                };
                let RawValue::Group(mut group) = self.initial_raw()? else {
                    return Err(BindingError::shape("", "an object", native));
                };
                merge_native(fields, &mut group, map)?;
                Ok(RawValue::Group(group))
            }
        }
    }

    /// Read the editable tree back through the getters. Empty text is
    /// `null`.
    pub fn from_raw(&self, raw: &RawValue) -> Result<Value, BindingError> {
        match (self.kind(), raw) {
            (FieldKind::Boolean, RawValue::Toggle(on)) => Ok(Value::Bool(*on)),
            (FieldKind::String | FieldKind::Number, RawValue::Text(text)) => self.coercion().text_to_native(text),
            (FieldKind::String, RawValue::Choice(choice)) => {
                Ok(choice.as_ref().map_or(Value::Null, |c| Value::String(c.clone())))
            }
            (FieldKind::Array { .. }, RawValue::Choices(selected)) => {
                Ok(Value::Array(selected.iter().cloned().map(Value::String).collect()))
            }
            (FieldKind::Array { subfield }, RawValue::List(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| subfield.from_raw(item).map_err(|e| e.within(&format!("[{i}]"))))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            (FieldKind::Object { fields }, RawValue::Group(group)) => {
                let mut out = Map::with_capacity(fields.len());
                for (name, field) in fields {
                    let value = match group.get(name) {
                        Some(raw) => field.from_raw(raw).map_err(|e| e.within(name))?,
                        None => Value::Null,
                    };
                    out.insert(name.clone(), value);
                }
                Ok(Value::Object(out))
            }
            (_, other) => Err(BindingError::Shape {
                field: String::new(),
                expected: format!("{} value", self.raw_kind()),
                actual: other.kind_name().to_string(),
            }),
        }
    }

    /// Validate an editable tree. Never fails; returns every failure.
    pub fn validate_raw(&self, raw: &RawValue) -> Vec<FieldFailure> {
        let mut failures = Vec::new();
        self.collect_failures("", raw, &mut failures);
        failures
    }

    /// The [`RawValue`] kind this field holds.
    pub fn raw_kind(&self) -> &'static str {
        self.cleared_raw().kind_name()
    }

    fn collect_failures(&self, path: &str, raw: &RawValue, out: &mut Vec<FieldFailure>) {
        match (self.kind(), raw) {
            (FieldKind::Boolean, RawValue::Toggle(_)) => {}
            (FieldKind::String | FieldKind::Number, RawValue::Text(text)) => push_result(out, path, self.check_text(text)),
            (FieldKind::String, RawValue::Choice(choice)) => {
                push_result(out, path, self.check_text(choice.as_deref().unwrap_or("")));
            }
            (FieldKind::Array { subfield }, RawValue::Choices(selected)) => {
                for (i, item) in selected.iter().enumerate() {
                    push_result(out, &join(path, &format!("[{i}]")), subfield.check_text(item));
                }
                self.check_count(path, selected.len(), out);
            }
            (FieldKind::Array { subfield }, RawValue::List(items)) => {
                for (i, item) in items.iter().enumerate() {
                    subfield.collect_failures(&join(path, &format!("[{i}]")), item, out);
                }
                self.check_count(path, items.len(), out);
            }
            (FieldKind::Object { fields }, RawValue::Group(group)) => {
                for (name, field) in fields {
                    let child = join(path, name);
                    match group.get(name) {
                        Some(raw) => field.collect_failures(&child, raw, out),
                        None => field.collect_failures(&child, &field.cleared_raw(), out),
                    }
                }
            }
            (_, other) => out.push(FieldFailure {
                path: path.to_string(),
                validator: "shape",
                message: format!("Expected a {} value, got {}", self.raw_kind(), other.kind_name()),
            }),
        }
    }

    fn check_count(&self, path: &str, count: usize, out: &mut Vec<FieldFailure>) {
        let attrs = self.attrs();
        if let Some(min) = attrs.min_items.filter(|min| count < *min) {
            out.push(FieldFailure {
                path: path.to_string(),
                validator: "min_items",
                message: format!("Must contain at least {min} items"),
            });
        }
        if let Some(max) = attrs.max_items.filter(|max| count > *max) {
            out.push(FieldFailure {
                path: path.to_string(),
                validator: "max_items",
                message: format!("Must contain at most {max} items"),
            });
        }
    }
}

fn merge_native(
    fields: &IndexMap<String, FieldDescriptor>,
    group: &mut IndexMap<String, RawValue>,
    native: &Map<String, Value>,
) -> Result<(), BindingError> {
    for (key, value) in native {
        match fields.get(key) {
            Some(field) => {
                group.insert(key.clone(), field.to_raw(value).map_err(|e| e.within(key))?);
            }
            None => tracing::debug!(key = %key, "ignoring data for unknown field"),
        }
    }
    Ok(())
}

fn push_result(out: &mut Vec<FieldFailure>, path: &str, result: ValidationResult) {
    out.extend(result.into_failures().into_iter().map(|f| FieldFailure {
        path: path.to_string(),
        validator: f.validator,
        message: f.message,
    }));
}

fn join(parent: &str, segment: &str) -> String {
    if parent.is_empty() {
        segment.to_string()
    } else if segment.starts_with('[') {
        format!("{parent}{segment}")
    } else {
        format!("{parent}.{segment}")
    }
}

/// A compiled form: the root Object descriptor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormModel {
    #[serde(flatten)]
    root: FieldDescriptor,
    #[serde(skip)]
    config: FormConfig,
}

impl FormModel {
    /// Field name of the root when the schema has no `title`.
    pub const DEFAULT_NAME: &'static str = "Form";

    /// Compile with the process-wide registry and the default
    /// configuration.
    pub fn from_schema(schema: &Value) -> Result<Self, CompileError> {
        Self::from_schema_with(schema, &registry::snapshot(), &FormConfig::default())
    }

    /// Compile with the process-wide registry and `config`.
    pub fn from_schema_with_config(schema: &Value, config: &FormConfig) -> Result<Self, CompileError> {
        Self::from_schema_with(schema, &registry::snapshot(), config)
    }

    /// Compile with an explicit registry and configuration.
    pub fn from_schema_with(
        schema: &Value,
        registry: &ConverterRegistry,
        config: &FormConfig,
    ) -> Result<Self, CompileError> {
        let Value::Object(schema) = schema else {
            return Err(CompileError::invalid(Self::DEFAULT_NAME, "the root schema must be a JSON object"));
        };
        let name = schema
            .get("title")
            .and_then(Value::as_str)
            .filter(|title| !title.is_empty())
            .unwrap_or(Self::DEFAULT_NAME);
        let ctx = CompileContext::new(registry, config);
        let root = object::compile(&ctx, name, false, schema)?;
        tracing::debug!(form = name, fields = root.fields().map_or(0, IndexMap::len), "compiled form");
        Ok(Self {
            root,
            config: config.clone(),
        })
    }

    pub fn root(&self) -> &FieldDescriptor {
        &self.root
    }

    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        self.root.field_name()
    }

    /// Top-level fields in `properties` order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldDescriptor)> {
        self.root
            .fields()
            .into_iter()
            .flatten()
            .map(|(name, field)| (name.as_str(), field))
    }

    /// A field by dotted path through nested objects, e.g. `address.city`.
    pub fn field(&self, path: &str) -> Option<&FieldDescriptor> {
        path.split('.')
            .try_fold(&self.root, |parent, name| parent.fields()?.get(name))
    }

    pub fn initial_raw(&self) -> Result<RawValue, BindingError> {
        self.root.initial_raw()
    }

    pub fn to_raw(&self, native: &Value) -> Result<RawValue, BindingError> {
        self.root.to_raw(native)
    }

    pub fn from_raw(&self, raw: &RawValue) -> Result<Value, BindingError> {
        self.root.from_raw(raw)
    }

    pub fn validate_raw(&self, raw: &RawValue) -> Vec<FieldFailure> {
        self.root.validate_raw(raw)
    }

    /// Load native data and validate it.
    pub fn check(&self, native: &Value) -> Result<Vec<FieldFailure>, BindingError> {
        Ok(self.validate_raw(&self.to_raw(native)?))
    }

    /// Native data as read back through the getters: defaults filled in,
    /// empty values as `null`, dates in ISO form.
    pub fn normalize(&self, native: &Value) -> Result<Value, BindingError> {
        self.from_raw(&self.to_raw(native)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn form(schema: Value) -> FormModel {
        FormModel::from_schema_with(&schema, &ConverterRegistry::with_defaults(), &FormConfig::default()).unwrap()
    }

    fn person() -> FormModel {
        form(json!({
            "title": "Person",
            "type": "object",
            "properties": {
                "name": {"type": "string", "title": "Name"},
                "age": {"type": "integer", "minimum": 0, "maximum": 150},
                "born": {"type": "string", "format": "date"},
                "active": {"type": "boolean", "default": true},
                "grade": {"type": "string", "enum": ["A", "B"]},
                "tags": {"type": "array", "items": {"type": "string"}, "maxItems": 2},
                "address": {
                    "type": "object",
                    "properties": {"city": {"type": "string", "default": "Bern"}},
                    "required": ["city"]
                }
            },
            "required": ["name", "age"]
        }))
    }

    #[test]
    fn root_name_and_field_lookup() {
        let form = person();
        assert_eq!(form.name(), "Person");
        assert_eq!(form.fields().count(), 7);
        assert_eq!(form.field("address.city").unwrap().default(), Some(&json!("Bern")));
        assert!(form.field("address.zip").is_none());
    }

    #[test]
    fn initial_raw_uses_defaults() {
        let raw = person().initial_raw().unwrap();
        assert_eq!(raw.get("active"), Some(&RawValue::Toggle(true)));
        assert_eq!(raw.get("grade"), Some(&RawValue::Choice(None)));
        assert_eq!(raw.get("tags"), Some(&RawValue::List(vec![])));
        assert_eq!(
            raw.get("address").and_then(|a| a.get("city")),
            Some(&RawValue::Text("Bern".into()))
        );
    }

    #[test]
    fn to_raw_and_back() {
        let form = person();
        let data = json!({
            "name": "Ada",
            "age": 36,
            "born": "1815-12-10",
            "tags": ["math"],
            "address": {"city": null}
        });
        let raw = form.to_raw(&data).unwrap();
        assert_eq!(raw.get("born"), Some(&RawValue::Text("10.12.1815".into())));
        assert_eq!(raw.get("age"), Some(&RawValue::Text("36".into())));
        let native = form.from_raw(&raw).unwrap();
        assert_eq!(
            native,
            json!({
                "name": "Ada",
                "age": 36,
                "born": "1815-12-10",
                "active": true,
                "grade": null,
                "tags": ["math"],
                "address": {"city": null}
            })
        );
    }

    #[test]
    fn validate_reports_paths() {
        let form = person();
        let failures = form
            .check(&json!({"name": "", "age": 200, "tags": ["a", "b", "c"], "address": {"city": null}}))
            .unwrap();
        let paths: Vec<(&str, &str)> = failures.iter().map(|f| (f.path.as_str(), f.validator)).collect();
        assert_eq!(
            paths,
            [
                ("name", "not_empty"),
                ("age", "range"),
                ("tags", "max_items"),
                ("address.city", "not_empty"),
            ]
        );
    }

    #[test]
    fn valid_data_has_no_failures() {
        let failures = person().check(&json!({"name": "Ada", "age": 36})).unwrap();
        assert!(failures.is_empty(), "{failures:?}");
    }

    #[test]
    fn list_failures_carry_indices() {
        let form = form(json!({
            "type": "object",
            "properties": {"scores": {"type": "array", "items": {"type": "integer", "maximum": 10}}}
        }));
        let raw = RawValue::Group(IndexMap::from([(
            "scores".to_string(),
            RawValue::List(vec![RawValue::Text("3".into()), RawValue::Text("11".into())]),
        )]));
        let failures = form.validate_raw(&raw);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].path, "scores[1]");
    }

    #[test]
    fn shape_errors_name_the_path() {
        let err = person().to_raw(&json!({"address": {"city": [1]}})).unwrap_err();
        assert_eq!(err.to_string(), "field 'address.city' expects a string, got array");
        let err = person().to_raw(&json!({"tags": ["ok", {}]})).unwrap_err();
        match err {
            BindingError::Shape { field, .. } => assert_eq!(field, "tags[1]"),
            other => panic!("expected Shape, got: {other}"),
        }
    }

    #[test]
    fn mismatched_raw_kind_is_a_failure() {
        let form = person();
        let mut raw = form.initial_raw().unwrap();
        *raw.get_mut("active").unwrap() = RawValue::Text("yes".into());
        let failures = form.validate_raw(&raw);
        assert!(failures
            .iter()
            .any(|f| f.path == "active" && f.message == "Expected a toggle value, got text"));
        assert!(form.from_raw(&raw).is_err());
    }

    #[test]
    fn non_object_root_is_invalid() {
        let err = FormModel::from_schema_with(&json!([1]), &ConverterRegistry::with_defaults(), &FormConfig::default())
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::CompileErrorKind::InvalidSchema);
    }

    #[test]
    fn raw_value_serde_shape() {
        let raw = RawValue::Choice(Some("A".into()));
        assert_eq!(serde_json::to_value(&raw).unwrap(), json!({"kind": "choice", "value": "A"}));
        let back: RawValue = serde_json::from_value(json!({"kind": "toggle", "value": true})).unwrap();
        assert_eq!(back, RawValue::Toggle(true));
    }
}
