//! Aggregate import report.

use std::fmt;

use serde::Serialize;

use crate::engine::{RowOutcome, RowResult};
use crate::error::RowError;

/// Which stage rejected a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Validation,
    Commit,
}

/// One row that did not commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowFailure {
    /// Zero-based position of the row in the committed sequence.
    pub row_index: usize,
    pub kind: FailureKind,
    pub message: String,
}

/// Result of one commit run.
///
/// Counts only include rows whose transaction committed. Failures are in
/// input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub rows_total: usize,
    pub rows_committed: usize,
    pub created_students: usize,
    pub updated_students: usize,
    pub created_guardians: usize,
    pub updated_guardians: usize,
    pub created_links: usize,
    pub created_schools: usize,
    pub created_classes: usize,
    pub created_enrollments: usize,
    /// Processing stopped early on request.
    pub cancelled: bool,
    pub failures: Vec<RowFailure>,
}

impl ImportReport {
    pub(crate) fn new(rows_total: usize) -> Self {
        Self {
            rows_total,
            ..Self::default()
        }
    }

    /// Folds one row result into the totals.
    pub(crate) fn record(&mut self, row_index: usize, result: RowResult) {
        match result {
            Ok(outcome) => self.add(&outcome),
            Err(err) => {
                let kind = match &err {
                    RowError::Validation(_) => FailureKind::Validation,
                    RowError::Commit(_) => FailureKind::Commit,
                };
                self.failures.push(RowFailure {
                    row_index,
                    kind,
                    message: err.to_string(),
                });
            }
        }
    }

    fn add(&mut self, outcome: &RowOutcome) {
        self.rows_committed += 1;
        if outcome.student_created {
            self.created_students += 1;
        } else {
            self.updated_students += 1;
        }
        self.created_guardians += outcome.guardians_created;
        self.updated_guardians += outcome.guardians_updated;
        self.created_links += outcome.links_created;
        self.created_schools += usize::from(outcome.school_created);
        self.created_classes += usize::from(outcome.class_created);
        self.created_enrollments += usize::from(outcome.enrollment_created);
    }

    pub fn rows_failed(&self) -> usize {
        self.failures.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} rows committed; students {} created, {} updated; guardians {} created, {} updated; \
             {} links, {} schools, {} classes, {} enrollments created; {} failed",
            self.rows_committed,
            self.rows_total,
            self.created_students,
            self.updated_students,
            self.created_guardians,
            self.updated_guardians,
            self.created_links,
            self.created_schools,
            self.created_classes,
            self.created_enrollments,
            self.rows_failed(),
        )?;
        if self.cancelled {
            f.write_str(" (cancelled)")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_normalize::RowValidationError;

    #[test]
    fn test_record_counts_and_failures() {
        let mut report = ImportReport::new(3);
        report.record(
            0,
            Ok(RowOutcome {
                student_created: true,
                guardians_created: 2,
                links_created: 2,
                school_created: true,
                ..RowOutcome::default()
            }),
        );
        report.record(1, Err(RowValidationError::MissingName.into()));
        report.record(2, Ok(RowOutcome::default()));

        assert_eq!(report.rows_committed, 2);
        assert_eq!(report.created_students, 1);
        assert_eq!(report.updated_students, 1);
        assert_eq!(report.created_guardians, 2);
        assert_eq!(
            report.failures,
            vec![RowFailure {
                row_index: 1,
                kind: FailureKind::Validation,
                message: "missing first and last name".to_string(),
            }]
        );
        insta::assert_snapshot!(report.to_string(), @"2/3 rows committed; students 1 created, 1 updated; guardians 2 created, 0 updated; 2 links, 1 schools, 0 classes, 0 enrollments created; 1 failed");
    }

    #[test]
    fn test_cancelled_summary() {
        let report = ImportReport {
            rows_total: 5,
            cancelled: true,
            ..ImportReport::default()
        };
        insta::assert_snapshot!(report.to_string(), @"0/5 rows committed; students 0 created, 0 updated; guardians 0 created, 0 updated; 0 links, 0 schools, 0 classes, 0 enrollments created; 0 failed (cancelled)");
    }
}
