//! The reconciliation loop.
//!
//! Rows are processed in order. Each row is normalized, then written inside
//! one storage transaction; a failure at any step rolls that row back and is
//! recorded, and the loop moves on.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, warn};

use roster_model::{ColumnMapping, NormalizedRow, SourceRow, TenantId};
use roster_normalize::normalize_row;
use roster_store::RosterStore;

use crate::error::{CommitStep, RowCommitError, RowError};
use crate::report::ImportReport;

/// Options for a commit run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitOptions {
    /// Create classrooms that do not exist yet. When off, rows are only
    /// enrolled in classrooms that already exist.
    pub create_classes: bool,
}

/// Shared flag to stop a running import between rows.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Rows already committed stay committed.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// What one committed row changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowOutcome {
    pub student_id: String,
    /// `false` means an existing student was updated.
    pub student_created: bool,
    pub guardians_created: usize,
    pub guardians_updated: usize,
    pub links_created: usize,
    pub school_created: bool,
    pub class_created: bool,
    pub enrollment_created: bool,
}

/// Per-row result folded into the [`ImportReport`].
pub type RowResult = Result<RowOutcome, RowError>;

/// Commits `rows` for `tenant` and reports what was durably written.
pub fn commit(
    store: &mut RosterStore,
    tenant: &TenantId,
    mapping: &ColumnMapping,
    rows: &[SourceRow],
    options: CommitOptions,
) -> ImportReport {
    commit_with_cancel(store, tenant, mapping, rows, options, &CancelFlag::new())
}

/// Like [`commit`], checking `cancel` before each row.
pub fn commit_with_cancel(
    store: &mut RosterStore,
    tenant: &TenantId,
    mapping: &ColumnMapping,
    rows: &[SourceRow],
    options: CommitOptions,
    cancel: &CancelFlag,
) -> ImportReport {
    let span = info_span!("import", tenant = %tenant, rows = rows.len());
    let _guard = span.enter();

    let mut report = ImportReport::new(rows.len());
    for (index, row) in rows.iter().enumerate() {
        if cancel.is_cancelled() {
            warn!(row = index, "import cancelled");
            report.cancelled = true;
            break;
        }

        let result = commit_row(store, tenant, mapping, row, options);
        match &result {
            Ok(outcome) => debug!(
                row = index,
                student_id = %outcome.student_id,
                created = outcome.student_created,
                guardians = outcome.guardians_created + outcome.guardians_updated,
                "row committed"
            ),
            Err(err) => warn!(row = index, error = %err, "row failed"),
        }
        report.record(index, result);
    }

    info!(
        committed = report.rows_committed,
        failed = report.rows_failed(),
        created_students = report.created_students,
        updated_students = report.updated_students,
        created_guardians = report.created_guardians,
        cancelled = report.cancelled,
        "import finished"
    );
    report
}

/// Normalizes and writes a single row as one atomic unit.
pub fn commit_row(
    store: &mut RosterStore,
    tenant: &TenantId,
    mapping: &ColumnMapping,
    row: &SourceRow,
    options: CommitOptions,
) -> RowResult {
    let normalized = normalize_row(tenant, row, mapping)?;
    Ok(write_row(store, &normalized, options)?)
}

fn write_row(
    store: &mut RosterStore,
    row: &NormalizedRow,
    options: CommitOptions,
) -> Result<RowOutcome, RowCommitError> {
    let student = &row.student;
    let tenant = &student.tenant_id;
    let tx = store.begin().map_err(RowCommitError::at(CommitStep::Begin))?;
    let mut outcome = RowOutcome::default();

    let school_id = match &student.school_name {
        Some(name) => {
            let school = tx
                .upsert_school(tenant, name)
                .map_err(RowCommitError::at(CommitStep::School))?;
            outcome.school_created = school.created;
            Some(school.id)
        }
        None => None,
    };

    let stored = tx
        .upsert_student(student, school_id.as_deref())
        .map_err(RowCommitError::at(CommitStep::Student))?;
    outcome.student_created = stored.created;

    for guardian in &row.guardians {
        let dedupe_key = guardian.key.resolve(&stored.id);
        let upserted = tx
            .upsert_guardian(tenant, guardian, &dedupe_key)
            .map_err(RowCommitError::at(CommitStep::Guardian(guardian.slot)))?;
        if upserted.created {
            outcome.guardians_created += 1;
        } else {
            outcome.guardians_updated += 1;
        }
        let linked = tx
            .link_guardian(
                tenant,
                &stored.id,
                &upserted.id,
                guardian.relationship.as_deref(),
            )
            .map_err(RowCommitError::at(CommitStep::Link(guardian.slot)))?;
        outcome.links_created += usize::from(linked);
    }

    if let Some(name) = &student.classroom_name {
        let classroom_id = if options.create_classes {
            let classroom = tx
                .upsert_classroom(tenant, name, student.grade.as_deref(), school_id.as_deref())
                .map_err(RowCommitError::at(CommitStep::Classroom))?;
            outcome.class_created = classroom.created;
            Some(classroom.id)
        } else {
            tx.find_classroom_id(tenant, name)
                .map_err(RowCommitError::at(CommitStep::Classroom))?
        };
        if let Some(classroom_id) = classroom_id {
            outcome.enrollment_created = tx
                .enroll(tenant, &classroom_id, &stored.id)
                .map_err(RowCommitError::at(CommitStep::Enrollment))?;
        }
    }

    tx.commit().map_err(RowCommitError::at(CommitStep::Commit))?;
    outcome.student_id = stored.id;
    Ok(outcome)
}
