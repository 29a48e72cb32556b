//! Error types for the roster data model.

use thiserror::Error;

use crate::field::TargetField;

/// Errors raised while building or editing a [`ColumnMapping`](crate::ColumnMapping).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    /// The header is not part of the source table.
    #[error("column not found: {0}")]
    ColumnNotFound(String),

    /// The header is already assigned to a different field.
    #[error("column '{column}' already mapped to '{field}'")]
    ColumnAlreadyUsed { column: String, field: TargetField },

    /// A field identifier that is not in the catalog.
    #[error("unknown target field: {0}")]
    UnknownField(String),
}

/// Errors raised while constructing a [`SourceTable`](crate::SourceTable).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// Two header cells carry the same name.
    #[error("duplicate header: {0}")]
    DuplicateHeader(String),

    /// A header cell is empty after trimming.
    #[error("header {index} is blank")]
    BlankHeader { index: usize },
}

pub type Result<T> = std::result::Result<T, MappingError>;
