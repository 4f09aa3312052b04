//! Command-line commands and shared glue.
//!
//! Each command parses its own arguments, configures logging, and delegates to
//! the library crate: `generate` drives the assembly pipeline, `sign` wraps a
//! collection in a signed envelope, `validate` runs the business-rule set, and
//! `diff` compares two documents for semantic equality.

mod common;
mod diff;
mod generate;
mod sign;
mod validate;

pub use diff::{DiffArgs, diff_collections};
pub use generate::{GenerateArgs, generate_collection};
pub use sign::{SignArgs, sign_collection};
pub use validate::{ValidateArgs, validate_collection};
