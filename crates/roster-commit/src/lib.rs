#![deny(unsafe_code)]

//! Reconciliation of normalized roster rows into storage.
//!
//! [`commit`] walks the rows in order. Every row is its own atomic unit:
//! school, student, guardians, guardian links, classroom and enrollment are
//! upserted by natural key inside one transaction. Row failures never stop
//! the run; they are collected in the [`ImportReport`].

mod engine;
mod error;
mod report;

pub use engine::{
    CancelFlag, CommitOptions, RowOutcome, RowResult, commit, commit_row, commit_with_cancel,
};
pub use error::{CommitStep, RowCommitError, RowError};
pub use report::{FailureKind, ImportReport, RowFailure};
