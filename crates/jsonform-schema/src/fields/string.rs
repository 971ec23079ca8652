//! String fields: free text, password, formatted (date, paths) or a
//! closed select when the schema has an `enum`.

use serde_json::Value;

use crate::context::CompileContext;
use crate::descriptor::{FieldAttrs, FieldDescriptor, FieldHeader, FieldKind, Restrict, Variant};
use crate::error::CompileError;
use crate::fields::{enum_choices, usize_key};
use crate::resolve::Schema;

pub fn compile(
    ctx: &CompileContext<'_>,
    field_name: &str,
    required: bool,
    schema: &Schema,
) -> Result<FieldDescriptor, CompileError> {
    let field = ctx.location(field_name);
    Variant::String.check_keys(field, schema)?;
    let header = FieldHeader::from_schema(field, field_name, required, schema)?;
    let mut attrs = FieldAttrs::with_default(schema);

    if let Some(values) = schema.get("enum") {
        attrs.choices = Some(enum_choices(field, values)?);
        attrs.suggester = ctx.config().enum_suggester;
    }
    if let Some(max) = schema.get("maxLength") {
        attrs.max_length = Some(usize_key(field, "maxLength", max)?);
    }
    if let Some(pattern) = schema.get("pattern") {
        let Value::String(pattern) = pattern else {
            return Err(CompileError::invalid(field, "'pattern' must be a string"));
        };
        attrs.restrict = Some(Restrict::compile(field, pattern)?);
    }
    if let Some(format) = schema.get("format") {
        let Value::String(format) = format else {
            return Err(CompileError::invalid(field, "'format' must be a string"));
        };
        attrs.password = format == "password";
        attrs.format = Some(format.clone());
    }

    FieldDescriptor::new(ctx, header, attrs, Vec::new(), FieldKind::String)
}
