//! # Compile Errors
//!
//! Every failure to turn a schema into a Field Model. Compilation is
//! fail-fast: the first error aborts the whole compile and nothing partial
//! is returned. Each variant names the field (as a dotted path from the
//! root) so the offending schema node can be located.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Error compiling a JSON Schema into a Field Model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// The schema node carries keys the field variant neither uses nor
    /// ignores.
    #[error("{variant} field '{field}' does not support schema keys: {}", keys.join(", "))]
    UnsupportedAttribute {
        /// Field variant name.
        variant: &'static str,
        /// Field path.
        field: String,
        /// Offending keys, sorted.
        keys: Vec<String>,
    },

    /// A `$ref` points at a definition that does not exist, or no `$defs`
    /// are in scope.
    #[error("unresolved reference '{reference}' in field '{field}'")]
    UnresolvedReference {
        /// Field path.
        field: String,
        /// The reference as written in the schema.
        reference: String,
    },

    /// An `allOf`/`anyOf` (or a multi-type `type` list) cannot be collapsed
    /// to a single concrete type.
    #[error("ambiguous union in field '{field}': {reason}")]
    AmbiguousUnion {
        /// Field path.
        field: String,
        /// What made the union ambiguous.
        reason: String,
    },

    /// Keys that are individually supported but not together, or not in
    /// this position.
    #[error("unsupported combination in field '{field}': {reason}")]
    UnsupportedCombination {
        /// Field path.
        field: String,
        /// The unsupported construct.
        reason: String,
    },

    /// A part the field variant cannot do without is missing.
    #[error("field '{field}' is missing required schema part '{part}'")]
    MissingRequiredSchemaPart {
        /// Field path.
        field: String,
        /// Name of the missing part.
        part: String,
    },

    /// No converter is registered for the field's type (or type and
    /// format).
    #[error("no converter registered for '{key}' (field '{field}')")]
    LookupFailure {
        /// Field path.
        field: String,
        /// Registry key that was tried last.
        key: String,
    },

    /// A converter was handed a schema whose `type` its variant does not
    /// support.
    #[error("{variant} field '{field}' does not support type '{schema_type}'")]
    UnsupportedType {
        /// Field variant name.
        variant: &'static str,
        /// Field path.
        field: String,
        /// The rejected type.
        schema_type: String,
    },

    /// A schema node or keyword value has the wrong JSON shape.
    #[error("invalid schema for field '{field}': {reason}")]
    InvalidSchema {
        /// Field path.
        field: String,
        /// What was wrong.
        reason: String,
    },
}

impl CompileError {
    /// The taxonomy entry of this error.
    pub fn kind(&self) -> CompileErrorKind {
        match self {
            Self::UnsupportedAttribute { .. } => CompileErrorKind::UnsupportedAttribute,
            Self::UnresolvedReference { .. } => CompileErrorKind::UnresolvedReference,
            Self::AmbiguousUnion { .. } => CompileErrorKind::AmbiguousUnion,
            Self::UnsupportedCombination { .. } => CompileErrorKind::UnsupportedCombination,
            Self::MissingRequiredSchemaPart { .. } => CompileErrorKind::MissingRequiredSchemaPart,
            Self::LookupFailure { .. } => CompileErrorKind::LookupFailure,
            Self::UnsupportedType { .. } => CompileErrorKind::UnsupportedType,
            Self::InvalidSchema { .. } => CompileErrorKind::InvalidSchema,
        }
    }

    /// Path of the field the error is about.
    pub fn field(&self) -> &str {
        match self {
            Self::UnsupportedAttribute { field, .. }
            | Self::UnresolvedReference { field, .. }
            | Self::AmbiguousUnion { field, .. }
            | Self::UnsupportedCombination { field, .. }
            | Self::MissingRequiredSchemaPart { field, .. }
            | Self::LookupFailure { field, .. }
            | Self::UnsupportedType { field, .. }
            | Self::InvalidSchema { field, .. } => field,
        }
    }

    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidSchema {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn combination(field: &str, reason: impl Into<String>) -> Self {
        Self::UnsupportedCombination {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn ambiguous(field: &str, reason: impl Into<String>) -> Self {
        Self::AmbiguousUnion {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn missing(field: &str, part: impl Into<String>) -> Self {
        Self::MissingRequiredSchemaPart {
            field: field.to_string(),
            part: part.into(),
        }
    }
}

/// Fieldless mirror of [`CompileError`] for matching on the taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompileErrorKind {
    UnsupportedAttribute,
    UnresolvedReference,
    AmbiguousUnion,
    UnsupportedCombination,
    MissingRequiredSchemaPart,
    LookupFailure,
    UnsupportedType,
    InvalidSchema,
}

impl fmt::Display for CompileErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::UnsupportedAttribute => "UnsupportedAttribute",
            Self::UnresolvedReference => "UnresolvedReference",
            Self::AmbiguousUnion => "AmbiguousUnion",
            Self::UnsupportedCombination => "UnsupportedCombination",
            Self::MissingRequiredSchemaPart => "MissingRequiredSchemaPart",
            Self::LookupFailure => "LookupFailure",
            Self::UnsupportedType => "UnsupportedType",
            Self::InvalidSchema => "InvalidSchema",
        };
        f.write_str(s)
    }
}
