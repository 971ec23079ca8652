//! Compile context threaded through recursive field construction.
//!
//! Carries the converter registry snapshot, the form configuration, the
//! nearest `$defs` map and the current nesting depth. A schema node with its
//! own `$defs` shadows the outer map for its subtree only.

use serde_json::Value;

use jsonform_core::FormConfig;

use crate::descriptor::FieldDescriptor;
use crate::error::CompileError;
use crate::registry::ConverterRegistry;
use crate::resolve::{Schema, DEFS_KEY};

/// State shared by every constructor during one compile.
#[derive(Debug, Clone)]
pub struct CompileContext<'a> {
    registry: &'a ConverterRegistry,
    config: &'a FormConfig,
    defs: Option<&'a Schema>,
    depth: usize,
    path: String,
}

impl<'a> CompileContext<'a> {
    /// A root context with no definitions in scope.
    pub fn new(registry: &'a ConverterRegistry, config: &'a FormConfig) -> Self {
        Self {
            registry,
            config,
            defs: None,
            depth: 0,
            path: String::new(),
        }
    }

    pub fn registry(&self) -> &'a ConverterRegistry {
        self.registry
    }

    pub fn config(&self) -> &'a FormConfig {
        self.config
    }

    /// The nearest enclosing `$defs`, if any.
    pub fn defs(&self) -> Option<&'a Schema> {
        self.defs
    }

    /// Object nesting depth; the root is 0.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Dotted path of the field being compiled. Empty at the root.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Name used in errors for the field `field_name` compiled in this
    /// context.
    pub fn location<'s>(&'s self, field_name: &'s str) -> &'s str {
        if self.path.is_empty() {
            field_name
        } else {
            &self.path
        }
    }

    /// A context whose `$defs` are those of `schema` when it declares any,
    /// and the current ones otherwise.
    pub fn scoped<'b>(&self, schema: &'b Schema) -> CompileContext<'b>
    where
        'a: 'b,
    {
        let defs: Option<&'b Schema> = match schema.get(DEFS_KEY) {
            Some(Value::Object(defs)) => Some(defs),
            _ => self.defs,
        };
        CompileContext {
            registry: self.registry,
            config: self.config,
            defs,
            depth: self.depth,
            path: self.path.clone(),
        }
    }

    /// A context one level deeper, for the child at `segment`.
    ///
    /// Segments starting with `[` attach without a dot. Fails once the
    /// configured depth is exceeded, which is how recursive `$ref`
    /// definitions end.
    pub fn child(&self, segment: &str) -> Result<Self, CompileError> {
        let path = if self.path.is_empty() {
            segment.to_string()
        } else if segment.starts_with('[') {
            format!("{}{segment}", self.path)
        } else {
            format!("{}.{segment}", self.path)
        };
        let depth = self.depth + 1;
        if depth > self.config.max_depth {
            return Err(CompileError::combination(
                &path,
                format!(
                    "nesting deeper than {} levels (recursive definitions are not supported)",
                    self.config.max_depth
                ),
            ));
        }
        Ok(Self {
            path,
            depth,
            ..self.clone()
        })
    }

    /// Compile `schema` through the registry converter for its type and
    /// format.
    pub fn compile(&self, field_name: &str, required: bool, schema: &Schema) -> Result<FieldDescriptor, CompileError> {
        let field = self.location(field_name);
        let schema_type = match schema.get("type") {
            Some(Value::String(t)) => t.as_str(),
            Some(other) => {
                return Err(CompileError::invalid(
                    field,
                    format!("'type' must be a string, got {other}"),
                ))
            }
            None => return Err(CompileError::missing(field, "type")),
        };
        let constructor = self.registry.lookup(field, schema_type, schema)?;
        let descriptor = constructor(self, field_name, required, schema)?;
        tracing::debug!(
            field,
            schema_type,
            required,
            variant = descriptor.variant().name(),
            "compiled field"
        );
        Ok(descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema(value: Value) -> Schema {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn nested_defs_shadow_outer() {
        let registry = ConverterRegistry::with_defaults();
        let config = FormConfig::default();
        let root = CompileContext::new(&registry, &config);
        let outer = schema(json!({"$defs": {"A": {"type": "string"}}}));
        let inner = schema(json!({"$defs": {"B": {"type": "integer"}}}));
        let plain = schema(json!({"type": "object"}));

        let outer_ctx = root.scoped(&outer);
        assert!(outer_ctx.defs().unwrap().contains_key("A"));
        let inner_ctx = outer_ctx.scoped(&inner);
        assert!(inner_ctx.defs().unwrap().contains_key("B"));
        assert!(!inner_ctx.defs().unwrap().contains_key("A"));
        let plain_ctx = outer_ctx.scoped(&plain);
        assert!(plain_ctx.defs().unwrap().contains_key("A"));
    }

    #[test]
    fn child_paths() {
        let registry = ConverterRegistry::with_defaults();
        let config = FormConfig::default();
        let root = CompileContext::new(&registry, &config);
        let address = root.child("address").unwrap();
        assert_eq!(address.path(), "address");
        assert_eq!(address.child("city").unwrap().path(), "address.city");
        assert_eq!(address.child("[]").unwrap().path(), "address[]");
        assert_eq!(root.location("Form"), "Form");
        assert_eq!(address.location("address"), "address");
    }

    #[test]
    fn child_depth_is_bounded() {
        let registry = ConverterRegistry::with_defaults();
        let config = FormConfig {
            max_depth: 2,
            ..FormConfig::default()
        };
        let root = CompileContext::new(&registry, &config);
        let two = root.child("a").unwrap().child("b").unwrap();
        assert_eq!(two.depth(), 2);
        let err = two.child("c").unwrap_err();
        assert_eq!(err.field(), "a.b.c");
    }
}
