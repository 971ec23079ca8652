//! Object fields.
//!
//! Compiles every entry of `properties` in document order. Each property is
//! first collapsed to a concrete schema, in this order of precedence:
//!
//! 1. `allOf`: the single branch ([`resolve::resolve_all_of`]),
//! 2. `anyOf`: the nullable union ([`resolve::resolve_any_of`]),
//! 3. `$ref`: the referenced definition,
//! 4. the property schema itself.
//!
//! A bare `enum` is typed as string, and the result is compiled through
//! the registry. The object's own `$defs`, when present, replace the
//! enclosing definitions for its subtree.

use indexmap::IndexMap;
use serde_json::Value;

use crate::context::CompileContext;
use crate::descriptor::{FieldAttrs, FieldDescriptor, FieldHeader, FieldKind, Variant};
use crate::error::CompileError;
use crate::resolve::{self, Schema};

pub fn compile(
    ctx: &CompileContext<'_>,
    field_name: &str,
    required: bool,
    schema: &Schema,
) -> Result<FieldDescriptor, CompileError> {
    let field = ctx.location(field_name);
    Variant::Object.check_keys(field, schema)?;
    let header = FieldHeader::from_schema(field, field_name, required, schema)?;
    let properties = match schema.get("properties") {
        Some(Value::Object(properties)) => properties,
        Some(_) => return Err(CompileError::invalid(field, "'properties' must be an object")),
        None => return Err(CompileError::missing(field, "properties")),
    };
    let required_names = required_names(field, schema)?;
    let attrs = FieldAttrs::with_default(schema);
    if let Some(default) = &attrs.default {
        if !default.is_object() && !default.is_null() {
            return Err(CompileError::invalid(field, format!("object default must be an object, got {default}")));
        }
    }

    let scope = ctx.scoped(schema);
    let mut fields = IndexMap::with_capacity(properties.len());
    for (name, property) in properties {
        let child = scope.child(name)?;
        let property_field = child.path();
        let property = resolve::as_schema(property_field, property)?;
        let resolved = concrete_schema(&child, property_field, property)?;
        let is_required = required_names.contains(&name.as_str());
        fields.insert(name.clone(), child.compile(name, is_required, &resolved)?);
    }

    FieldDescriptor::new(ctx, header, attrs, Vec::new(), FieldKind::Object { fields })
}

fn required_names<'s>(field: &str, schema: &'s Schema) -> Result<Vec<&'s str>, CompileError> {
    match schema.get("required") {
        None => Ok(Vec::new()),
        Some(Value::Array(names)) => names
            .iter()
            .map(|name| {
                name.as_str()
                    .ok_or_else(|| CompileError::invalid(field, "'required' must list property names"))
            })
            .collect(),
        Some(_) => Err(CompileError::invalid(field, "'required' must be an array")),
    }
}

fn concrete_schema(ctx: &CompileContext<'_>, field: &str, property: &Schema) -> Result<Schema, CompileError> {
    let defs = ctx.defs();
    let mut schema = if property.contains_key("allOf") {
        resolve::resolve_all_of(defs, field, property)?
    } else if property
        .get("anyOf")
        .and_then(Value::as_array)
        .is_some_and(|branches| !branches.is_empty())
    {
        let (schema_type, mut schema) = resolve::resolve_any_of(defs, field, property)?;
        schema
            .entry("type".to_string())
            .or_insert_with(|| Value::String(schema_type));
        schema
    } else if let Some(reference) = property.get("$ref") {
        resolve::resolve_ref(defs, field, resolve::ref_str(field, reference)?)?
    } else {
        property.clone()
    };

    resolve::collapse_nullable_type(field, &mut schema)?;
    if !schema.contains_key("type") {
        if !schema.contains_key("enum") {
            return Err(CompileError::missing(field, "type"));
        }
        schema.insert("type".to_string(), Value::String("string".to_string()));
    }
    Ok(schema)
}
