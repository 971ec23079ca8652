//! Integer and number fields.
//!
//! Always carry the base `integer`/`number` validator; a range validator
//! follows when any bound is present. Enumerated numbers are not supported.

use jsonform_core::{NumberRange, Validator};

use crate::context::CompileContext;
use crate::descriptor::{FieldAttrs, FieldDescriptor, FieldHeader, FieldKind, Variant};
use crate::error::CompileError;
use crate::fields::number_key;
use crate::resolve::Schema;

pub fn compile(
    ctx: &CompileContext<'_>,
    field_name: &str,
    required: bool,
    schema: &Schema,
) -> Result<FieldDescriptor, CompileError> {
    let field = ctx.location(field_name);
    Variant::Number.check_keys(field, schema)?;
    let header = FieldHeader::from_schema(field, field_name, required, schema)?;
    if schema.contains_key("enum") {
        return Err(CompileError::combination(field, "enum choices for numbers are not supported"));
    }

    let mut attrs = FieldAttrs::with_default(schema);
    let mut validators = vec![if header.schema_type == "integer" {
        Validator::Integer
    } else {
        Validator::Number
    }];

    let bound = |key: &str| schema.get(key).map(|v| number_key(field, key, v)).transpose();
    let range = NumberRange {
        minimum: bound("minimum")?,
        maximum: bound("maximum")?,
        exclusive_minimum: bound("exclusiveMinimum")?,
        exclusive_maximum: bound("exclusiveMaximum")?,
    };
    if !range.is_unbounded() {
        validators.push(Validator::Range(range));
        attrs.range = Some(range);
    }
    if let Some(format) = schema.get("format") {
        let format = format
            .as_str()
            .ok_or_else(|| CompileError::invalid(field, "'format' must be a string"))?;
        attrs.format = Some(format.to_string());
    }

    FieldDescriptor::new(ctx, header, attrs, validators, FieldKind::Number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompileErrorKind;
    use crate::registry::ConverterRegistry;
    use jsonform_core::FormConfig;
    use serde_json::{json, Value};

    fn compile_json(schema: Value, required: bool) -> Result<FieldDescriptor, CompileError> {
        let registry = ConverterRegistry::with_defaults();
        let config = FormConfig::default();
        let ctx = CompileContext::new(&registry, &config);
        compile(&ctx, "n", required, schema.as_object().unwrap())
    }

    #[test]
    fn inclusive_bounds() {
        let field = compile_json(json!({"type": "integer", "minimum": 10, "maximum": 115}), true).unwrap();
        assert_eq!(field.validators().len(), 2);
        for bad in ["9", "116"] {
            assert_eq!(field.check_text(bad).messages(), vec!["Must be between 10 and 115."]);
        }
        for good in ["10", "50", "115"] {
            assert!(field.check_text(good).is_valid());
        }
    }

    #[test]
    fn exclusive_bounds() {
        let field = compile_json(json!({"type": "number", "exclusiveMinimum": 10, "exclusiveMaximum": 115}), true).unwrap();
        for bad in ["10", "115"] {
            assert_eq!(
                field.check_text(bad).messages(),
                vec!["Must be greater than 10 and smaller than 115"]
            );
        }
        for good in ["11", "114", "10.5"] {
            assert!(field.check_text(good).is_valid());
        }
    }

    #[test]
    fn base_validator_only_without_bounds() {
        let field = compile_json(json!({"type": "number"}), false).unwrap();
        assert_eq!(field.validators(), [Validator::Number]);
        assert!(field.attrs().range.is_none());
        assert!(field.check_text("").is_valid());
        assert_eq!(field.check_text("abc").messages(), vec!["Must be a valid number."]);
    }

    #[test]
    fn integer_rejects_fractions() {
        let field = compile_json(json!({"type": "integer"}), true).unwrap();
        assert_eq!(field.check_text("1.5").messages(), vec!["Must be a valid integer."]);
    }

    #[test]
    fn enum_is_unsupported() {
        let err = compile_json(json!({"type": "integer", "enum": [1, 2]}), false).unwrap_err();
        assert_eq!(err.kind(), CompileErrorKind::UnsupportedCombination);
    }

    #[test]
    fn non_numeric_bound_is_invalid() {
        let err = compile_json(json!({"type": "number", "exclusiveMaximum": true}), false).unwrap_err();
        assert_eq!(err.kind(), CompileErrorKind::InvalidSchema);
    }
}
