//! # Widget Options
//!
//! The construction options a renderer needs for each field, derived from
//! a compiled descriptor. One [`WidgetOptions`] variant per widget:
//!
//! | Descriptor                         | Widget        |
//! |------------------------------------|---------------|
//! | String, Number                     | `Input`       |
//! | String with `enum`                 | `Select` (or `Input` with suggestions) |
//! | Boolean                            | `Switch`      |
//! | Array of enumerated strings        | `MultiSelect` |
//! | Other Array                        | `List`        |
//! | Object                             | `Group`       |

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use jsonform_core::Validator;

use crate::descriptor::{is_truthy, scalar_text, FieldDescriptor, FieldKind};

/// Options for one widget.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "widget", rename_all = "snake_case")]
pub enum WidgetOptions {
    Input(InputOptions),
    Select(SelectOptions),
    Switch(SwitchOptions),
    MultiSelect(MultiSelectOptions),
    List(ListOptions),
    Group(GroupOptions),
}

impl WidgetOptions {
    /// Name of the widget, as serialized in the `widget` tag.
    pub fn widget(&self) -> &'static str {
        match self {
            Self::Input(_) => "input",
            Self::Select(_) => "select",
            Self::Switch(_) => "switch",
            Self::MultiSelect(_) => "multi_select",
            Self::List(_) => "list",
            Self::Group(_) => "group",
        }
    }
}

/// A single-line text input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputOptions {
    pub name: String,
    /// Initial editable text.
    pub value: String,
    pub placeholder: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restrict: Option<String>,
    pub password: bool,
    /// 0 means unlimited.
    pub max_length: usize,
    /// `text`, `integer` or `number`.
    pub input_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    pub blank_allowed: bool,
    pub validators: Vec<Validator>,
    /// Re-run validators on every change instead of only when the text
    /// changed; set for filesystem formats.
    pub always_revalidate: bool,
    /// Case-insensitive completion candidates.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl InputOptions {
    /// First suggestion starting with `prefix`, ignoring case.
    pub fn suggest(&self, prefix: &str) -> Option<&str> {
        if prefix.is_empty() {
            return None;
        }
        let prefix = prefix.to_lowercase();
        self.suggestions
            .iter()
            .find(|s| s.to_lowercase().starts_with(&prefix))
            .map(String::as_str)
    }
}

/// A closed single-choice select.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOptions {
    pub name: String,
    pub options: Vec<String>,
    pub prompt: String,
    pub allow_blank: bool,
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwitchOptions {
    pub name: String,
    pub label: String,
    pub value: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MultiSelectOptions {
    pub name: String,
    pub options: Vec<String>,
    pub selected: Vec<String>,
}

/// A growable list of item widgets built from `item`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListOptions {
    pub name: String,
    pub label: String,
    pub required: bool,
    pub item: Box<WidgetOptions>,
    /// Default items as native values.
    pub data: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupOptions {
    pub name: String,
    pub label: String,
    pub required: bool,
    pub children: IndexMap<String, WidgetOptions>,
}

impl FieldDescriptor {
    /// Widget construction options for this field.
    pub fn options(&self) -> WidgetOptions {
        match self.kind() {
            FieldKind::Boolean => WidgetOptions::Switch(SwitchOptions {
                name: self.field_name().to_string(),
                label: self.display_label().to_string(),
                value: self.default().is_some_and(is_truthy),
            }),
            FieldKind::String if self.is_select() => WidgetOptions::Select(self.select_options()),
            FieldKind::String | FieldKind::Number => WidgetOptions::Input(self.input_options()),
            FieldKind::Array { subfield } => match self.choices() {
                Some(choices) => WidgetOptions::MultiSelect(MultiSelectOptions {
                    name: self.field_name().to_string(),
                    options: choices.to_vec(),
                    selected: default_items(self).iter().map(scalar_text).collect(),
                }),
                None => WidgetOptions::List(ListOptions {
                    name: self.field_name().to_string(),
                    label: self.label().to_string(),
                    required: self.required(),
                    item: Box::new(subfield.options()),
                    data: default_items(self),
                }),
            },
            FieldKind::Object { fields } => WidgetOptions::Group(GroupOptions {
                name: self.field_name().to_string(),
                label: self.label().to_string(),
                required: self.required(),
                children: fields
                    .iter()
                    .map(|(name, field)| (name.clone(), field.options()))
                    .collect(),
            }),
        }
    }

    /// Initial choice of a select: the default, else the first choice for
    /// required fields, else none.
    pub fn initial_choice(&self) -> Option<String> {
        match self.default() {
            Some(default) if !default.is_null() => Some(scalar_text(default)),
            _ if self.required() => self.attrs().choices.as_ref().and_then(|c| c.first().cloned()),
            _ => None,
        }
    }

    fn select_options(&self) -> SelectOptions {
        let label = if self.label().is_empty() {
            self.field_name()
        } else {
            self.label()
        };
        SelectOptions {
            name: self.field_name().to_string(),
            options: self.attrs().choices.clone().unwrap_or_default(),
            prompt: format!("Select {label}"),
            allow_blank: !self.required(),
            value: self.initial_choice(),
        }
    }

    fn input_options(&self) -> InputOptions {
        let attrs = self.attrs();
        let input_type = match self.schema_type() {
            "integer" => "integer",
            "number" => "number",
            _ => "text",
        };
        let suggestions = if attrs.suggester {
            attrs.choices.clone().unwrap_or_default()
        } else {
            Vec::new()
        };
        InputOptions {
            name: self.field_name().to_string(),
            value: self.default_text(),
            placeholder: self.description().to_string(),
            restrict: attrs.restrict.as_ref().map(|r| r.as_str().to_string()),
            password: attrs.password,
            max_length: attrs.max_length.unwrap_or(0),
            input_type,
            format: attrs.format.clone(),
            blank_allowed: self.blank_allowed(),
            validators: self.effective_validators(),
            always_revalidate: self.format_validator().is_some_and(Validator::touches_filesystem),
            suggestions,
        }
    }
}

fn default_items(field: &FieldDescriptor) -> Vec<Value> {
    match field.default() {
        Some(Value::Array(items)) => items.clone(),
        _ => Vec::new(),
    }
}
