//! # Schema Resolver
//!
//! Pure functions that turn the indirect shapes of a property schema into
//! one concrete schema:
//!
//! - `$ref` lookups into the nearest `$defs` ([`resolve_ref`]),
//! - single-branch `allOf` ([`resolve_all_of`]),
//! - nullable `anyOf` ([`resolve_any_of`]),
//! - `"type": [T, "null"]` lists ([`collapse_nullable_type`]).
//!
//! Nothing here mutates its input. Every resolved schema is an owned copy,
//! so the caller's document and the shared `$defs` stay untouched across a
//! compile.

use serde_json::{Map, Value};

use crate::error::CompileError;

/// Prefixes stripped from a `$ref` before it is looked up in `$defs`.
pub const REF_PREFIXES: [&str; 2] = ["#/components/schemas/", "#/$defs/"];

/// Key of the local definitions map.
pub const DEFS_KEY: &str = "$defs";

/// A JSON object schema.
pub type Schema = Map<String, Value>;

/// Strip a known reference prefix, leaving the definition key.
///
/// References without a known prefix are returned unchanged.
pub fn strip_ref(reference: &str) -> &str {
    REF_PREFIXES
        .iter()
        .find_map(|prefix| reference.strip_prefix(prefix))
        .unwrap_or(reference)
}

/// Resolve `reference` against `defs`, returning an owned copy of the
/// definition.
pub fn resolve_ref(defs: Option<&Schema>, field: &str, reference: &str) -> Result<Schema, CompileError> {
    let unresolved = || CompileError::UnresolvedReference {
        field: field.to_string(),
        reference: reference.to_string(),
    };
    let key = strip_ref(reference);
    let definition = defs.and_then(|defs| defs.get(key)).ok_or_else(unresolved)?;
    tracing::trace!(field, reference, key, "resolved reference");
    match definition {
        Value::Object(schema) => Ok(schema.clone()),
        other => Err(CompileError::invalid(
            field,
            format!("definition '{key}' is not an object schema (got {other})"),
        )),
    }
}

/// The inferred type of a schema: its `type`, or `string` for an `enum`
/// without one.
pub fn infer_type(schema: &Schema) -> Option<&str> {
    match schema.get("type") {
        Some(Value::String(t)) => Some(t),
        None if schema.contains_key("enum") => Some("string"),
        _ => None,
    }
}

/// Collapse the only `allOf` branch of `property` into a concrete schema.
///
/// A direct branch inherits the property's `description`; a `$ref` branch
/// is resolved through `defs`. Either way a `default` on the property wins.
pub fn resolve_all_of(defs: Option<&Schema>, field: &str, property: &Schema) -> Result<Schema, CompileError> {
    let branches = as_branches(field, property, "allOf")?;
    let branch = match branches {
        [] => return Err(CompileError::missing(field, "allOf branch")),
        [only] => only,
        _ => {
            return Err(CompileError::ambiguous(
                field,
                format!("allOf with {} branches", branches.len()),
            ))
        }
    };
    let branch = as_schema(field, branch)?;
    let mut resolved = match branch.get("$ref") {
        Some(reference) => resolve_ref(defs, field, ref_str(field, reference)?)?,
        None => {
            let mut schema = branch.clone();
            inherit(&mut schema, property, "description");
            schema
        }
    };
    if let Some(default) = property.get("default") {
        resolved.insert("default".to_string(), default.clone());
    }
    Ok(resolved)
}

/// Collapse a nullable `anyOf` into one `(type, schema)` pair.
///
/// `null` branches are dropped; at most two other branches may remain.
/// Branches are scanned most-keys-first and keyed by inferred type, first
/// one winning per type:
///
/// - `$ref` branches count only when the definition is an `enum`,
/// - inline `object` branches and arrays of objects are skipped.
///
/// Exactly one type must survive. The survivor inherits `description`,
/// `title` and `default` from the property.
pub fn resolve_any_of(defs: Option<&Schema>, field: &str, property: &Schema) -> Result<(String, Schema), CompileError> {
    let branches = as_branches(field, property, "anyOf")?
        .iter()
        .map(|branch| as_schema(field, branch))
        .collect::<Result<Vec<_>, _>>()?;
    let mut candidates: Vec<&Schema> = branches
        .into_iter()
        .filter(|branch| branch.get("type").and_then(Value::as_str) != Some("null"))
        .collect();
    if candidates.len() > 2 {
        return Err(CompileError::ambiguous(
            field,
            format!(
                "anyOf with {} non-null branches; only one type besides null is supported",
                candidates.len()
            ),
        ));
    }
    // stable: equal sizes keep document order
    candidates.sort_by(|a, b| b.len().cmp(&a.len()));

    let mut inferred: Vec<(String, Schema)> = Vec::new();
    for branch in candidates {
        let Some((schema_type, schema)) = any_of_candidate(defs, field, branch)? else {
            continue;
        };
        if !inferred.iter().any(|(t, _)| *t == schema_type) {
            inferred.push((schema_type, schema));
        }
    }

    let mut survivors = inferred.into_iter();
    let (schema_type, mut schema) = match (survivors.next(), survivors.next()) {
        (Some(only), None) => only,
        (Some((first, _)), Some((second, _))) => {
            return Err(CompileError::ambiguous(
                field,
                format!("multiple inferred types: {first}, {second}"),
            ))
        }
        (None, _) => return Err(CompileError::ambiguous(field, "could not infer any type")),
    };
    for key in ["description", "title", "default"] {
        inherit(&mut schema, property, key);
    }
    Ok((schema_type, schema))
}

fn any_of_candidate(
    defs: Option<&Schema>,
    field: &str,
    branch: &Schema,
) -> Result<Option<(String, Schema)>, CompileError> {
    if let Some(reference) = branch.get("$ref") {
        let reference = ref_str(field, reference)?;
        let definition = resolve_ref(defs, field, reference)?;
        let has_choices = definition
            .get("enum")
            .and_then(Value::as_array)
            .is_some_and(|choices| !choices.is_empty());
        if !has_choices {
            tracing::debug!(field, reference, "skipping anyOf reference branch without enum");
            return Ok(None);
        }
        return Ok(infer_type(&definition).map(|t| (t.to_string(), definition.clone())));
    }
    let Some(schema_type) = infer_type(branch) else {
        return Err(CompileError::missing(field, "anyOf branch type"));
    };
    match schema_type {
        "object" => {
            tracing::debug!(field, "skipping inline object anyOf branch");
            Ok(None)
        }
        "array" if items_are_objects(defs, field, branch)? => {
            tracing::debug!(field, "skipping array-of-object anyOf branch");
            Ok(None)
        }
        t => Ok(Some((t.to_string(), branch.clone()))),
    }
}

fn items_are_objects(defs: Option<&Schema>, field: &str, array: &Schema) -> Result<bool, CompileError> {
    let Some(Value::Object(items)) = array.get("items") else {
        return Ok(false);
    };
    let item_type = match items.get("$ref") {
        Some(reference) => {
            let resolved = resolve_ref(defs, field, ref_str(field, reference)?)?;
            infer_type(&resolved).map(str::to_string)
        }
        None => infer_type(items).map(str::to_string),
    };
    Ok(item_type.as_deref() == Some("object"))
}

/// Replace a `"type": [T, "null"]` list with `"type": T`.
///
/// Lists with no non-null type, or more than one, are ambiguous.
pub fn collapse_nullable_type(field: &str, schema: &mut Schema) -> Result<(), CompileError> {
    let Some(Value::Array(types)) = schema.get("type") else {
        return Ok(());
    };
    let concrete: Vec<&str> = types
        .iter()
        .filter_map(Value::as_str)
        .filter(|t| *t != "null")
        .collect();
    let collapsed = match concrete.as_slice() {
        [only] => only.to_string(),
        [] => return Err(CompileError::ambiguous(field, "type list has no non-null type")),
        many => {
            return Err(CompileError::ambiguous(
                field,
                format!("type list with several types: {}", many.join(", ")),
            ))
        }
    };
    schema.insert("type".to_string(), Value::String(collapsed));
    Ok(())
}

fn inherit(schema: &mut Schema, property: &Schema, key: &str) {
    if let Some(value) = property.get(key) {
        schema.entry(key.to_string()).or_insert_with(|| value.clone());
    }
}

fn as_branches<'s>(field: &str, property: &'s Schema, key: &str) -> Result<&'s [Value], CompileError> {
    match property.get(key) {
        Some(Value::Array(branches)) => Ok(branches),
        _ => Err(CompileError::invalid(field, format!("'{key}' must be an array of schemas"))),
    }
}

pub(crate) fn as_schema<'s>(field: &str, value: &'s Value) -> Result<&'s Schema, CompileError> {
    value
        .as_object()
        .ok_or_else(|| CompileError::invalid(field, format!("expected an object schema, got {value}")))
}

pub(crate) fn ref_str<'s>(field: &str, reference: &'s Value) -> Result<&'s str, CompileError> {
    reference
        .as_str()
        .ok_or_else(|| CompileError::invalid(field, "'$ref' must be a string"))
}
