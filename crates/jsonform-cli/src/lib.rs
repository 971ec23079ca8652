//! # jsonform-cli — Field Model Command Line
//!
//! Thin front end over `jsonform-schema` for trying schemas out from a shell.
//!
//! ## Subcommands
//!
//! - `jsonform inspect <schema>`: compile a schema and print the field tree
//!   (`--format text` or `--format json`).
//! - `jsonform check <schema> <data>`: load native data into the compiled
//!   form, validate it and print failures. Exit code 1 when invalid.
//!   `--normalize` prints the data as read back through the field getters.
//!
//! Schemas and data are read as YAML when the file extension is `.yaml` or
//! `.yml`, and as JSON otherwise. Global `--config <file.yaml>` overrides
//! the [`FormConfig`](jsonform_core::FormConfig) otherwise read from
//! `JSONFORM_*` environment variables.
//!
//! ## Crate Policy
//!
//! - All domain logic lives in `jsonform-schema` and `jsonform-core`.
//! - Handlers return `anyhow::Result<u8>` exit codes; `main` logs errors.

pub mod check;
pub mod inspect;
pub mod load;
