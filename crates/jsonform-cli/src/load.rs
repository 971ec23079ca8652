//! # Document Loading
//!
//! Reads schemas, data files and form configuration from disk.

use std::path::Path;

use anyhow::Context;
use jsonform_core::FormConfig;
use serde_json::Value;

/// Whether a path should be parsed as YAML, judged by its extension.
pub fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Read a JSON or YAML document into a JSON value.
pub fn load_document(path: &Path) -> anyhow::Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value = if is_yaml(path) {
        serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse YAML in {}", path.display()))?
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse JSON in {}", path.display()))?
    };
    Ok(value)
}

/// Resolve the form configuration: a YAML file when given, else the
/// environment.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<FormConfig> {
    let config = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            let config: FormConfig = serde_yaml::from_str(&content)
                .with_context(|| format!("failed to parse config {}", path.display()))?;
            config
                .validate()
                .with_context(|| format!("invalid config {}", path.display()))?;
            config
        }
        None => FormConfig::from_env().context("invalid JSONFORM_* environment")?,
    };
    tracing::debug!(?config, "resolved form configuration");
    Ok(config)
}
