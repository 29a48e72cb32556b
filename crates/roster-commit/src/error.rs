//! Row-level error types.

use std::fmt;

use thiserror::Error;

use roster_model::GuardianSlot;
use roster_normalize::RowValidationError;
use roster_store::StoreError;

/// The write step of a row that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitStep {
    Begin,
    School,
    Student,
    Guardian(GuardianSlot),
    Link(GuardianSlot),
    Classroom,
    Enrollment,
    Commit,
}

impl fmt::Display for CommitStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommitStep::Begin => f.write_str("begin"),
            CommitStep::School => f.write_str("school"),
            CommitStep::Student => f.write_str("student"),
            CommitStep::Guardian(slot) => write!(f, "guardian {}", slot.number()),
            CommitStep::Link(slot) => write!(f, "guardian {} link", slot.number()),
            CommitStep::Classroom => f.write_str("classroom"),
            CommitStep::Enrollment => f.write_str("enrollment"),
            CommitStep::Commit => f.write_str("commit"),
        }
    }
}

/// A storage failure inside one row's transaction. The row was rolled back.
#[derive(Debug, Error)]
#[error("{step}: {source}")]
pub struct RowCommitError {
    pub step: CommitStep,
    #[source]
    pub source: StoreError,
}

impl RowCommitError {
    pub(crate) fn at(step: CommitStep) -> impl FnOnce(StoreError) -> RowCommitError {
        move |source| RowCommitError { step, source }
    }

    /// Lock contention outlasted the busy timeout; retrying the row may succeed.
    pub fn is_busy(&self) -> bool {
        self.source.is_busy()
    }
}

/// Why a row did not commit.
#[derive(Debug, Error)]
pub enum RowError {
    /// Skipped before any write.
    #[error(transparent)]
    Validation(#[from] RowValidationError),

    /// Rolled back after a storage failure.
    #[error(transparent)]
    Commit(#[from] RowCommitError),
}
