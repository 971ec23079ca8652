//! # Check Subcommand
//!
//! Loads native data into a compiled form and reports validation failures.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use jsonform_core::FormConfig;
use jsonform_schema::{FieldFailure, FormModel};
use serde_json::Value;

use crate::load::load_document;

/// Arguments for the check subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// JSON Schema file (JSON or YAML).
    pub schema: PathBuf,

    /// Native data file (JSON or YAML).
    pub data: PathBuf,

    /// Print the data as read back through the field getters.
    #[arg(long)]
    pub normalize: bool,
}

/// Outcome of checking one data document.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckReport {
    pub failures: Vec<FieldFailure>,
    /// Present when normalization was requested.
    pub normalized: Option<Value>,
}

impl CheckReport {
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }

    /// Human-readable report, one failure per line.
    pub fn render(&self) -> anyhow::Result<String> {
        let mut out = String::new();
        for failure in &self.failures {
            out.push_str(&format!("{}: {} ({})\n", failure.path, failure.message, failure.validator));
        }
        if let Some(normalized) = &self.normalized {
            out.push_str(&serde_json::to_string_pretty(normalized).context("failed to serialize data")?);
            out.push('\n');
        }
        Ok(out)
    }
}

/// Validate `data` against `model`, normalizing it when asked.
///
/// Data of the wrong shape for a field (an object where a string belongs)
/// is an error rather than a failure.
pub fn check_data(model: &FormModel, data: &Value, normalize: bool) -> anyhow::Result<CheckReport> {
    let raw = model.to_raw(data).context("data does not fit the form")?;
    let failures = model.validate_raw(&raw);
    let normalized = if normalize {
        Some(model.from_raw(&raw).context("failed to read data back")?)
    } else {
        None
    };
    Ok(CheckReport { failures, normalized })
}

/// Execute the check subcommand. Returns exit code 1 when the data is
/// invalid.
pub fn run_check(args: &CheckArgs, config: &FormConfig) -> anyhow::Result<u8> {
    let schema = load_document(&args.schema)?;
    let model = FormModel::from_schema_with_config(&schema, config)
        .with_context(|| format!("failed to compile {}", args.schema.display()))?;
    let data = load_document(&args.data)?;
    let report = check_data(&model, &data, args.normalize)
        .with_context(|| format!("failed to check {}", args.data.display()))?;

    print!("{}", report.render()?);
    if report.is_valid() {
        tracing::info!(data = %args.data.display(), "data is valid");
        Ok(0)
    } else {
        tracing::warn!(failures = report.failures.len(), "data is invalid");
        Ok(1)
    }
}
