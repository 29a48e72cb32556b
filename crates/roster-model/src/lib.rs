#![deny(unsafe_code)]

//! Shared data model for roster import.
//!
//! The types here are passed between the reader, the column mapper, the row
//! normalizer and the commit engine. None of them touch storage.

pub mod error;
pub mod field;
pub mod mapping;
pub mod record;
pub mod table;

pub use error::{MappingError, Result, TableError};
pub use field::{GuardianSlot, TargetField, ValueKind};
pub use mapping::ColumnMapping;
pub use record::{
    Gender, GuardianKey, NormalizedGuardian, NormalizedRow, NormalizedStudent, TenantId,
};
pub use table::{SourceRow, SourceTable};
