//! # jsonform-schema — JSON Schema to Field Model Compiler
//!
//! Compiles a JSON Schema document into a [`FormModel`]: a tree of immutable
//! [`FieldDescriptor`]s carrying labels, requiredness, defaults, validators
//! and value coercion for every field a form renderer has to show.
//!
//! ## Pipeline
//!
//! ```text
//!   schema ──► resolve ($ref / allOf / anyOf) ──► registry lookup (type[.format])
//!                                                      │
//!                              FieldDescriptor ◄── converter (fields::*)
//! ```
//!
//! - [`resolve`] collapses indirect property shapes into concrete schemas.
//! - [`registry`] maps `type` / `type.format` to converters, process-wide
//!   or per call.
//! - [`fields`] holds the five built-in converters.
//! - [`options`] derives widget construction options from descriptors.
//! - [`form`] exchanges native JSON data with an editable tree and validates
//!   it.
//!
//! ## Key Design Principles
//!
//! 1. **Fail fast at compile time.** Unknown schema keys, unresolvable
//!    references and ambiguous unions abort the compile with a
//!    [`CompileError`] naming the field path. Nothing partial is returned.
//!
//! 2. **Never mutate the input.** Resolution works on owned copies; the
//!    caller's schema and its `$defs` are untouched.
//!
//! 3. **Immutable output.** A compiled model is `Send + Sync` and can be
//!    shared without locking. Registry changes after a compile do not
//!    affect it.
//!
//! ## Crate Policy
//!
//! - Depends only on `jsonform-core` internally.
//! - Invalid user data is reported as failures, never as errors.
//! - No `unsafe` code.

pub mod context;
pub mod descriptor;
pub mod error;
pub mod fields;
pub mod form;
pub mod options;
pub mod registry;
pub mod resolve;

pub use context::CompileContext;
pub use descriptor::{FieldAttrs, FieldDescriptor, FieldHeader, FieldKind, Variant};
pub use error::{CompileError, CompileErrorKind};
pub use form::{FieldFailure, FormModel, RawValue};
pub use options::WidgetOptions;
pub use registry::{register_global, reset_global, ConverterRegistry};
