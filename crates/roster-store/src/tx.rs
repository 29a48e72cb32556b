//! Per-row write transaction with natural-key upserts.
//!
//! Every upsert is `INSERT ... ON CONFLICT DO NOTHING` followed, when nothing
//! was inserted, by an update or lookup on the same natural key. Inside an
//! `IMMEDIATE` transaction the pair cannot race with another writer.

use rusqlite::{OptionalExtension, Transaction, params};
use tracing::trace;
use uuid::Uuid;

use roster_model::{Gender, NormalizedGuardian, NormalizedStudent, TenantId};

use crate::error::{Result, StoreError};
use crate::types::Upserted;

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// An open write transaction. Dropped without [`StoreTx::commit`], it rolls back.
pub struct StoreTx<'conn> {
    tx: Transaction<'conn>,
    now: String,
}

impl<'conn> StoreTx<'conn> {
    pub(crate) fn new(tx: Transaction<'conn>) -> Self {
        Self {
            tx,
            now: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// School keyed by `(tenant, name)`. An existing school is never modified.
    pub fn upsert_school(&self, tenant: &TenantId, name: &str) -> Result<Upserted> {
        let id = new_id();
        let inserted = self
            .tx
            .execute(
                "INSERT INTO schools(id, tenant_id, name, created_at) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(tenant_id, name) DO NOTHING",
                params![id, tenant.as_str(), name, self.now],
            )
            .map_err(StoreError::op("insert school"))?;
        if inserted == 1 {
            trace!(%id, "created school");
            return Ok(Upserted::created(id));
        }
        let existing = self
            .tx
            .query_row(
                "SELECT id FROM schools WHERE tenant_id = ?1 AND name = ?2",
                params![tenant.as_str(), name],
                |row| row.get(0),
            )
            .map_err(StoreError::op("find school"))?;
        Ok(Upserted::matched(existing))
    }

    /// Student keyed by `(tenant, external_id)`.
    ///
    /// Without an external id there is no natural key and a new student is
    /// always inserted. On a match, names are replaced and every other field
    /// only by a present value. Derived pronouns never replace pronouns that
    /// were read from a roster.
    pub fn upsert_student(
        &self,
        student: &NormalizedStudent,
        school_id: Option<&str>,
    ) -> Result<Upserted> {
        let id = new_id();
        let tenant = student.tenant_id.as_str();
        let gender = student.gender.as_ref().map(Gender::as_str);
        let inserted = self
            .tx
            .execute(
                "INSERT INTO students(
                    id, tenant_id, external_id, first_name, last_name, grade, email, gender,
                    pronouns, pronouns_derived, iep, ell, medical, school_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?15)
                 ON CONFLICT(tenant_id, external_id) DO NOTHING",
                params![
                    id,
                    tenant,
                    student.external_id,
                    student.first,
                    student.last,
                    student.grade,
                    student.email,
                    gender,
                    student.pronouns,
                    student.pronouns_derived,
                    student.iep.unwrap_or(false),
                    student.ell.unwrap_or(false),
                    student.medical.unwrap_or(false),
                    school_id,
                    self.now,
                ],
            )
            .map_err(StoreError::op("insert student"))?;
        if inserted == 1 {
            trace!(%id, "created student");
            return Ok(Upserted::created(id));
        }

        let existing = self
            .tx
            .query_row(
                "UPDATE students SET
                    first_name = ?3,
                    last_name = ?4,
                    grade = COALESCE(?5, grade),
                    email = COALESCE(?6, email),
                    gender = COALESCE(?7, gender),
                    pronouns = CASE
                        WHEN ?8 IS NULL OR (?9 AND pronouns IS NOT NULL AND NOT pronouns_derived)
                        THEN pronouns ELSE ?8 END,
                    pronouns_derived = CASE
                        WHEN ?8 IS NULL OR (?9 AND pronouns IS NOT NULL AND NOT pronouns_derived)
                        THEN pronouns_derived ELSE ?9 END,
                    iep = COALESCE(?10, iep),
                    ell = COALESCE(?11, ell),
                    medical = COALESCE(?12, medical),
                    school_id = COALESCE(?13, school_id),
                    updated_at = ?14
                 WHERE tenant_id = ?1 AND external_id = ?2
                 RETURNING id",
                params![
                    tenant,
                    student.external_id,
                    student.first,
                    student.last,
                    student.grade,
                    student.email,
                    gender,
                    student.pronouns,
                    student.pronouns_derived,
                    student.iep,
                    student.ell,
                    student.medical,
                    school_id,
                    self.now,
                ],
                |row| row.get(0),
            )
            .map_err(StoreError::op("update student"))?;
        Ok(Upserted::matched(existing))
    }

    /// Guardian keyed by `(tenant, dedupe_key)`.
    ///
    /// On a match the phone is refreshed when present, and the name is
    /// replaced unless the incoming name was synthesized.
    pub fn upsert_guardian(
        &self,
        tenant: &TenantId,
        guardian: &NormalizedGuardian,
        dedupe_key: &str,
    ) -> Result<Upserted> {
        let id = new_id();
        let inserted = self
            .tx
            .execute(
                "INSERT INTO guardians(id, tenant_id, dedupe_key, name, email, phone, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
                 ON CONFLICT(tenant_id, dedupe_key) DO NOTHING",
                params![
                    id,
                    tenant.as_str(),
                    dedupe_key,
                    guardian.name,
                    guardian.email,
                    guardian.phone,
                    self.now,
                ],
            )
            .map_err(StoreError::op("insert guardian"))?;
        if inserted == 1 {
            trace!(%id, "created guardian");
            return Ok(Upserted::created(id));
        }

        let existing = self
            .tx
            .query_row(
                "UPDATE guardians SET
                    name = CASE WHEN ?3 THEN name ELSE ?4 END,
                    email = COALESCE(email, ?5),
                    phone = COALESCE(?6, phone),
                    updated_at = ?7
                 WHERE tenant_id = ?1 AND dedupe_key = ?2
                 RETURNING id",
                params![
                    tenant.as_str(),
                    dedupe_key,
                    guardian.synthesized_name,
                    guardian.name,
                    guardian.email,
                    guardian.phone,
                    self.now,
                ],
                |row| row.get(0),
            )
            .map_err(StoreError::op("update guardian"))?;
        Ok(Upserted::matched(existing))
    }

    /// Links a guardian to a student. Returns `true` when the link is new.
    ///
    /// An existing link keeps its relationship label; a missing label is
    /// filled in.
    pub fn link_guardian(
        &self,
        tenant: &TenantId,
        student_id: &str,
        guardian_id: &str,
        relationship: Option<&str>,
    ) -> Result<bool> {
        let inserted = self
            .tx
            .execute(
                "INSERT INTO student_guardians(tenant_id, student_id, guardian_id, relationship, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(tenant_id, student_id, guardian_id) DO NOTHING",
                params![tenant.as_str(), student_id, guardian_id, relationship, self.now],
            )
            .map_err(StoreError::op("link guardian"))?;
        if inserted == 0 && relationship.is_some() {
            self.tx
                .execute(
                    "UPDATE student_guardians SET relationship = ?4
                     WHERE tenant_id = ?1 AND student_id = ?2 AND guardian_id = ?3
                       AND relationship IS NULL",
                    params![tenant.as_str(), student_id, guardian_id, relationship],
                )
                .map_err(StoreError::op("label guardian link"))?;
        }
        Ok(inserted == 1)
    }

    /// Classroom keyed by `(tenant, name)`. An existing classroom only has
    /// its missing grade and school filled in.
    pub fn upsert_classroom(
        &self,
        tenant: &TenantId,
        name: &str,
        grade: Option<&str>,
        school_id: Option<&str>,
    ) -> Result<Upserted> {
        let id = new_id();
        let inserted = self
            .tx
            .execute(
                "INSERT INTO classrooms(id, tenant_id, name, grade, school_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(tenant_id, name) DO NOTHING",
                params![id, tenant.as_str(), name, grade, school_id, self.now],
            )
            .map_err(StoreError::op("insert classroom"))?;
        if inserted == 1 {
            trace!(%id, "created classroom");
            return Ok(Upserted::created(id));
        }
        let existing = self
            .tx
            .query_row(
                "UPDATE classrooms SET
                    grade = COALESCE(grade, ?3),
                    school_id = COALESCE(school_id, ?4)
                 WHERE tenant_id = ?1 AND name = ?2
                 RETURNING id",
                params![tenant.as_str(), name, grade, school_id],
                |row| row.get(0),
            )
            .map_err(StoreError::op("update classroom"))?;
        Ok(Upserted::matched(existing))
    }

    /// Id of an existing classroom, without creating one.
    pub fn find_classroom_id(&self, tenant: &TenantId, name: &str) -> Result<Option<String>> {
        self.tx
            .query_row(
                "SELECT id FROM classrooms WHERE tenant_id = ?1 AND name = ?2",
                params![tenant.as_str(), name],
                |row| row.get(0),
            )
            .optional()
            .map_err(StoreError::op("find classroom"))
    }

    /// Enrolls a student in a classroom. Returns `true` when the enrollment is new.
    pub fn enroll(&self, tenant: &TenantId, classroom_id: &str, student_id: &str) -> Result<bool> {
        let inserted = self
            .tx
            .execute(
                "INSERT INTO enrollments(tenant_id, classroom_id, student_id, created_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(tenant_id, classroom_id, student_id) DO NOTHING",
                params![tenant.as_str(), classroom_id, student_id, self.now],
            )
            .map_err(StoreError::op("enroll student"))?;
        Ok(inserted == 1)
    }

    /// Makes every write of this transaction durable.
    pub fn commit(self) -> Result<()> {
        self.tx.commit().map_err(StoreError::op("commit"))
    }
}
