//! Error types for Mission Control core operations

use thiserror::Error;

/// Errors raised while interpreting raw values as domain types.
///
/// Parsers never return these; they are for strict conversions such as
/// validating a mutation request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
