//! # jsonform-core — Foundational Types for jsonform
//!
//! This crate holds everything a compiled field needs at runtime that does
//! not depend on JSON Schema resolution: validators, format-aware value
//! coercion, form configuration and the shared error types. The schema
//! compiler in `jsonform-schema` builds on top of it; it depends on nothing
//! internal.
//!
//! ## Key Design Principles
//!
//! 1. **Validators are data.** A [`Validator`] is a closed enum carrying its
//!    parameters (numeric bounds, date patterns, blank policy). It can be
//!    serialized, compared in tests and inspected by a renderer.
//!
//! 2. **Validation failures are values.** Running validators yields a
//!    [`ValidationResult`] with user-facing messages. Nothing in this crate
//!    returns an error for an invalid user input.
//!
//! 3. **Filesystem checks are never cached.** The `file-path`,
//!    `directory-path` and `path` validators hit the filesystem on every call;
//!    [`Validator::touches_filesystem`] tells callers not to memoize them.
//!
//! 4. **Coercion is symmetric.** Every [`Coercion`] setter produces text its
//!    getter accepts and its format validator passes.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `jsonform-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod binding;
pub mod config;
pub mod error;
pub mod validator;

// Re-export primary types for ergonomic imports.
pub use binding::{Coercion, TypedValue};
pub use config::FormConfig;
pub use error::{BindingError, ConfigError};
pub use validator::{Failure, NumberRange, ValidationResult, Validator};
