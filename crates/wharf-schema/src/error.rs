//! Schema engine error types.

use thiserror::Error;

/// Errors produced by the pure schema algebra.
///
/// Coercion failure is deliberately not represented here: it is the routine
/// trigger for discard-record production, modeled as `None`, never an error.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("unknown column type '{token}'")]
    UnknownColumnType { token: String },
}
