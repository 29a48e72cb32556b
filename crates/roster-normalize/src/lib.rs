#![deny(unsafe_code)]

//! Row normalization for roster import.
//!
//! [`normalize_row`] applies a final [`ColumnMapping`](roster_model::ColumnMapping)
//! to one raw row and returns a typed student record plus up to two
//! guardians, or a [`RowValidationError`] that the caller records as a
//! skipped row.

mod boolean;
mod error;
mod guardian;
mod row;
mod text;

pub use boolean::{TRUE_TOKENS, coerce_bool};
pub use error::{Result, RowValidationError};
pub use guardian::{extract_guardian, name_from_email};
pub use row::normalize_row;
