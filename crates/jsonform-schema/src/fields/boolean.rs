//! Boolean fields: rendered as a switch, no validators.

use crate::context::CompileContext;
use crate::descriptor::{FieldAttrs, FieldDescriptor, FieldHeader, FieldKind, Variant};
use crate::error::CompileError;
use crate::resolve::Schema;

pub fn compile(
    ctx: &CompileContext<'_>,
    field_name: &str,
    required: bool,
    schema: &Schema,
) -> Result<FieldDescriptor, CompileError> {
    let field = ctx.location(field_name);
    Variant::Boolean.check_keys(field, schema)?;
    let header = FieldHeader::from_schema(field, field_name, required, schema)?;
    if let Some(default) = schema.get("default") {
        if !default.is_boolean() && !default.is_null() {
            return Err(CompileError::invalid(field, format!("boolean default must be true or false, got {default}")));
        }
    }
    FieldDescriptor::new(ctx, header, FieldAttrs::with_default(schema), Vec::new(), FieldKind::Boolean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ConverterRegistry;
    use jsonform_core::FormConfig;
    use serde_json::json;

    #[test]
    fn compiles_switch() {
        let registry = ConverterRegistry::with_defaults();
        let config = FormConfig::default();
        let ctx = CompileContext::new(&registry, &config);
        let schema = json!({"type": "boolean", "title": "Active", "default": true});
        let field = compile(&ctx, "active", false, schema.as_object().unwrap()).unwrap();
        assert_eq!(field.variant(), Variant::Boolean);
        assert_eq!(field.label(), "Active");
        assert_eq!(field.default(), Some(&json!(true)));
        assert!(field.validators().is_empty());
    }

    #[test]
    fn rejects_string_default() {
        let registry = ConverterRegistry::with_defaults();
        let config = FormConfig::default();
        let ctx = CompileContext::new(&registry, &config);
        let schema = json!({"type": "boolean", "default": "yes"});
        let err = compile(&ctx, "active", false, schema.as_object().unwrap()).unwrap_err();
        assert!(err.to_string().contains("boolean default"));
    }
}
