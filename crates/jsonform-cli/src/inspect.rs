//! # Inspect Subcommand
//!
//! Compiles a schema and prints the resulting field tree.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, ValueEnum};
use jsonform_core::FormConfig;
use jsonform_schema::{FieldDescriptor, FormModel};

use crate::load::load_document;

/// Output format for `inspect`.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// One line per field, indented by nesting.
    #[default]
    Text,
    /// The serialized descriptor tree.
    Json,
}

/// Arguments for the inspect subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// JSON Schema file (JSON or YAML).
    pub schema: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Execute the inspect subcommand.
pub fn run_inspect(args: &InspectArgs, config: &FormConfig) -> anyhow::Result<u8> {
    let schema = load_document(&args.schema)?;
    let model = FormModel::from_schema_with_config(&schema, config)
        .with_context(|| format!("failed to compile {}", args.schema.display()))?;
    tracing::info!(form = model.name(), fields = model.fields().count(), "compiled schema");
    print!("{}", render(&model, args.format)?);
    Ok(0)
}

/// Render a compiled model in the requested format.
pub fn render(model: &FormModel, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(model)),
        OutputFormat::Json => {
            let mut out = serde_json::to_string_pretty(model).context("failed to serialize model")?;
            out.push('\n');
            Ok(out)
        }
    }
}

/// Render the field tree as indented text.
///
/// ```text
/// UserModel: object
///   age: integer required validators=integer,range widget=input
/// ```
pub fn render_text(model: &FormModel) -> String {
    let mut out = String::new();
    write_field(&mut out, model.name(), model.root(), 0);
    out
}

fn write_field(out: &mut String, name: &str, field: &FieldDescriptor, depth: usize) {
    let _ = write!(out, "{:indent$}{name}: {}", "", field.schema_type(), indent = depth * 2);
    if field.required() {
        out.push_str(" required");
    }
    if !field.label().is_empty() && field.label() != name {
        let _ = write!(out, " label={:?}", field.label());
    }
    if let Some(format) = field.format() {
        let _ = write!(out, " format={format}");
    }
    let validators: Vec<&str> = field.effective_validators().iter().map(|v| v.name()).collect();
    if !validators.is_empty() {
        let _ = write!(out, " validators={}", validators.join(","));
    }
    if let Some(choices) = field.choices() {
        let _ = write!(out, " choices={}", choices.join("|"));
    }
    if let Some(default) = field.default() {
        let _ = write!(out, " default={default}");
    }
    let _ = writeln!(out, " widget={}", field.options().widget());

    if let Some(fields) = field.fields() {
        for (child_name, child) in fields {
            write_field(out, child_name, child, depth + 1);
        }
    }
    if let Some(item) = field.subfield() {
        write_field(out, "[]", item, depth + 1);
    }
}
