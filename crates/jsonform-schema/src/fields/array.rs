//! Array fields.
//!
//! An array owns exactly one subfield describing every element. Elements
//! must be scalar: object items and union items are rejected. Enumerated
//! string items make the array a multi-select.

use serde_json::Value;

use crate::context::CompileContext;
use crate::descriptor::{FieldAttrs, FieldDescriptor, FieldHeader, FieldKind, Variant};
use crate::error::CompileError;
use crate::fields::usize_key;
use crate::resolve::{self, Schema};

pub fn compile(
    ctx: &CompileContext<'_>,
    field_name: &str,
    required: bool,
    schema: &Schema,
) -> Result<FieldDescriptor, CompileError> {
    let field = ctx.location(field_name);
    Variant::Array.check_keys(field, schema)?;
    let header = FieldHeader::from_schema(field, field_name, required, schema)?;
    let mut attrs = FieldAttrs::with_default(schema);
    if let Some(min) = schema.get("minItems") {
        attrs.min_items = Some(usize_key(field, "minItems", min)?);
    }
    if let Some(max) = schema.get("maxItems") {
        attrs.max_items = Some(usize_key(field, "maxItems", max)?);
    }
    if let Some(default) = &attrs.default {
        if !default.is_array() && !default.is_null() {
            return Err(CompileError::invalid(field, format!("array default must be an array, got {default}")));
        }
    }

    let scope = ctx.scoped(schema);
    let items = item_schema(&scope, field, schema)?;
    let item_ctx = scope.child("[]")?;
    let subfield = item_ctx.compile(field_name, true, &items)?;

    FieldDescriptor::new(
        ctx,
        header,
        attrs,
        Vec::new(),
        FieldKind::Array {
            subfield: Box::new(subfield),
        },
    )
}

/// The concrete element schema: `$ref` resolved, nullable type lists
/// collapsed and a bare `enum` typed as string.
fn item_schema(scope: &CompileContext<'_>, field: &str, schema: &Schema) -> Result<Schema, CompileError> {
    let items = match schema.get("items") {
        None | Some(Value::Null) => return Err(CompileError::missing(field, "items")),
        Some(Value::Object(items)) if items.is_empty() => return Err(CompileError::missing(field, "items")),
        Some(items) => resolve::as_schema(field, items)?,
    };
    let mut items = match items.get("$ref") {
        Some(reference) => resolve::resolve_ref(scope.defs(), field, resolve::ref_str(field, reference)?)?,
        None => items.clone(),
    };
    if items.contains_key("anyOf") || items.contains_key("allOf") {
        return Err(CompileError::combination(field, "array items with anyOf/allOf are not supported"));
    }
    resolve::collapse_nullable_type(field, &mut items)?;
    if !items.contains_key("type") && items.contains_key("enum") {
        items.insert("type".to_string(), Value::String("string".to_string()));
    }
    match items.get("type").and_then(Value::as_str) {
        None => Err(CompileError::missing(field, "items.type")),
        Some("object") => Err(CompileError::combination(field, "arrays of objects are not supported")),
        Some(_) => Ok(items),
    }
}
