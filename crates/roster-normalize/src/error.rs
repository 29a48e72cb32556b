//! Row validation errors.

use thiserror::Error;

/// Why a row was skipped before reaching the commit engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowValidationError {
    /// Both name parts are empty after trimming.
    #[error("missing first and last name")]
    MissingName,

    /// First name is empty after trimming.
    #[error("missing first name")]
    MissingFirstName,

    /// Last name is empty after trimming.
    #[error("missing last name")]
    MissingLastName,
}

/// Result type for row normalization.
pub type Result<T> = std::result::Result<T, RowValidationError>;
