//! # Converter Registry
//!
//! Maps a schema `type` (optionally refined by `format`) to the constructor
//! that builds its [`FieldDescriptor`]. Keys are `type` or `type.format`;
//! lookups try the format-specific key first and fall back to the type.
//!
//! A process-wide registry is available through [`global`]. It is guarded
//! by a read/write lock: registration takes the write lock, and each
//! compile takes one read-locked snapshot up front so lookups during the
//! compile never wait on a writer.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use serde_json::Value;

use crate::context::CompileContext;
use crate::descriptor::FieldDescriptor;
use crate::error::CompileError;
use crate::fields;
use crate::resolve::Schema;

/// A field constructor: `(context, field_name, required, schema)`.
pub type Constructor =
    Arc<dyn Fn(&CompileContext<'_>, &str, bool, &Schema) -> Result<FieldDescriptor, CompileError> + Send + Sync>;

/// Registry of field constructors keyed by `type` or `type.format`.
#[derive(Clone, Default)]
pub struct ConverterRegistry {
    converters: HashMap<String, Constructor>,
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterRegistry")
            .field("keys", &self.keys())
            .finish()
    }
}

impl ConverterRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in converters for `boolean`, `string`,
    /// `integer`, `number`, `array` and `object`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("boolean", None, fields::boolean::compile);
        registry.register("string", None, fields::string::compile);
        registry.register("integer", None, fields::number::compile);
        registry.register("number", None, fields::number::compile);
        registry.register("array", None, fields::array::compile);
        registry.register("object", None, fields::object::compile);
        registry
    }

    /// Registry key for a type and optional format.
    pub fn key(schema_type: &str, format: Option<&str>) -> String {
        match format {
            Some(format) => format!("{schema_type}.{format}"),
            None => schema_type.to_string(),
        }
    }

    /// Register `constructor` for `schema_type` (and `format`). The last
    /// registration for a key wins.
    pub fn register<F>(&mut self, schema_type: &str, format: Option<&str>, constructor: F)
    where
        F: Fn(&CompileContext<'_>, &str, bool, &Schema) -> Result<FieldDescriptor, CompileError>
            + Send
            + Sync
            + 'static,
    {
        let key = Self::key(schema_type, format);
        if self.converters.insert(key.clone(), Arc::new(constructor)).is_some() {
            tracing::warn!(key = %key, "replaced registered converter");
        }
    }

    /// Remove the converter for a key. Returns whether one was registered.
    pub fn unregister(&mut self, schema_type: &str, format: Option<&str>) -> bool {
        self.converters.remove(&Self::key(schema_type, format)).is_some()
    }

    /// Whether a converter is registered under exactly this key.
    pub fn contains(&self, schema_type: &str, format: Option<&str>) -> bool {
        self.converters.contains_key(&Self::key(schema_type, format))
    }

    /// All registered keys, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.converters.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Find the converter for `schema_type`, preferring the entry for the
    /// schema's `format`.
    pub fn lookup(&self, field: &str, schema_type: &str, schema: &Schema) -> Result<&Constructor, CompileError> {
        if let Some(Value::String(format)) = schema.get("format") {
            if let Some(constructor) = self.converters.get(&Self::key(schema_type, Some(format))) {
                return Ok(constructor);
            }
        }
        self.converters
            .get(schema_type)
            .ok_or_else(|| CompileError::LookupFailure {
                field: field.to_string(),
                key: schema_type.to_string(),
            })
    }
}

static GLOBAL: OnceLock<RwLock<ConverterRegistry>> = OnceLock::new();

/// The process-wide registry, initialized with the defaults on first use.
pub fn global() -> &'static RwLock<ConverterRegistry> {
    GLOBAL.get_or_init(|| RwLock::new(ConverterRegistry::with_defaults()))
}

/// Register a constructor in the process-wide registry.
pub fn register_global<F>(schema_type: &str, format: Option<&str>, constructor: F)
where
    F: Fn(&CompileContext<'_>, &str, bool, &Schema) -> Result<FieldDescriptor, CompileError>
        + Send
        + Sync
        + 'static,
{
    global().write().register(schema_type, format, constructor);
}

/// Restore the process-wide registry to the defaults.
pub fn reset_global() {
    *global().write() = ConverterRegistry::with_defaults();
}

/// A copy of the process-wide registry for one compile.
pub fn snapshot() -> ConverterRegistry {
    global().read().clone()
}
