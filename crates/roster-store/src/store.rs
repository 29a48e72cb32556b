//! Connection management and read queries.

use std::path::Path;
use std::time::Duration;

use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params};
use tracing::debug;

use roster_model::TenantId;

use crate::error::{Result, StoreError};
use crate::schema::SCHEMA;
use crate::tx::StoreTx;
use crate::types::{EntityCounts, StoredClassroom, StoredGuardian, StoredStudent};

/// How long a writer waits for another connection's lock before failing.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const STUDENT_COLUMNS: &str = "id, external_id, first_name, last_name, grade, pronouns, pronouns_derived, iep, ell, medical, school_id";

/// A roster database. Each import owns one store (one connection).
#[derive(Debug)]
pub struct RosterStore {
    conn: Connection,
}

impl RosterStore {
    /// Opens or creates a database file.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| StoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        conn.busy_timeout(DEFAULT_BUSY_TIMEOUT)
            .map_err(|source| StoreError::Schema { source })?;
        // WAL lets readers proceed while another import holds the write lock.
        let mode: String = conn
            .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
            .map_err(|source| StoreError::Schema { source })?;
        debug!(path = %path.display(), journal_mode = %mode, "opened database");
        Self::init(conn)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| StoreError::Open {
            path: ":memory:".into(),
            source,
        })?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.busy_timeout(DEFAULT_BUSY_TIMEOUT)
            .map_err(|source| StoreError::Schema { source })?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|source| StoreError::Schema { source })?;
        conn.execute_batch(SCHEMA)
            .map_err(|source| StoreError::Schema { source })?;
        Ok(Self { conn })
    }

    /// Starts an `IMMEDIATE` transaction: the write lock is taken up front,
    /// so natural-key lookups and inserts inside it cannot interleave with
    /// another writer. Dropping the transaction without committing rolls it
    /// back.
    pub fn begin(&mut self) -> Result<StoreTx<'_>> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(StoreError::op("begin transaction"))?;
        Ok(StoreTx::new(tx))
    }

    /// Raw connection, for maintenance and tests.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Row counts of every entity table for one tenant.
    pub fn counts(&self, tenant: &TenantId) -> Result<EntityCounts> {
        let count = |table: &str| -> Result<u64> {
            let n: i64 = self
                .conn
                .query_row(
                    &format!("SELECT COUNT(*) FROM {table} WHERE tenant_id = ?1"),
                    params![tenant.as_str()],
                    |row| row.get(0),
                )
                .map_err(StoreError::op("count rows"))?;
            Ok(u64::try_from(n).unwrap_or_default())
        };
        Ok(EntityCounts {
            schools: count("schools")?,
            students: count("students")?,
            guardians: count("guardians")?,
            links: count("student_guardians")?,
            classrooms: count("classrooms")?,
            enrollments: count("enrollments")?,
        })
    }

    /// All students of a tenant, in insertion order.
    pub fn students(&self, tenant: &TenantId) -> Result<Vec<StoredStudent>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {STUDENT_COLUMNS} FROM students WHERE tenant_id = ?1 ORDER BY rowid"
            ))
            .map_err(StoreError::op("list students"))?;
        let rows = stmt
            .query_map(params![tenant.as_str()], student_from_row)
            .map_err(StoreError::op("list students"))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(StoreError::op("list students"))
    }

    pub fn find_student(&self, tenant: &TenantId, external_id: &str) -> Result<Option<StoredStudent>> {
        self.conn
            .query_row(
                &format!(
                    "SELECT {STUDENT_COLUMNS} FROM students WHERE tenant_id = ?1 AND external_id = ?2"
                ),
                params![tenant.as_str(), external_id],
                student_from_row,
            )
            .optional()
            .map_err(StoreError::op("find student"))
    }

    pub fn find_guardian(&self, tenant: &TenantId, dedupe_key: &str) -> Result<Option<StoredGuardian>> {
        self.conn
            .query_row(
                "SELECT id, dedupe_key, name, email, phone FROM guardians
                 WHERE tenant_id = ?1 AND dedupe_key = ?2",
                params![tenant.as_str(), dedupe_key],
                |row| {
                    Ok(StoredGuardian {
                        id: row.get(0)?,
                        dedupe_key: row.get(1)?,
                        name: row.get(2)?,
                        email: row.get(3)?,
                        phone: row.get(4)?,
                    })
                },
            )
            .optional()
            .map_err(StoreError::op("find guardian"))
    }

    /// Guardians linked to a student, with the link's relationship label.
    pub fn guardians_of(
        &self,
        tenant: &TenantId,
        student_id: &str,
    ) -> Result<Vec<(StoredGuardian, Option<String>)>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT g.id, g.dedupe_key, g.name, g.email, g.phone, l.relationship
                 FROM student_guardians l JOIN guardians g ON g.id = l.guardian_id
                 WHERE l.tenant_id = ?1 AND l.student_id = ?2
                 ORDER BY l.rowid",
            )
            .map_err(StoreError::op("list guardians"))?;
        let rows = stmt
            .query_map(params![tenant.as_str(), student_id], |row| {
                Ok((
                    StoredGuardian {
                        id: row.get(0)?,
                        dedupe_key: row.get(1)?,
                        name: row.get(2)?,
                        email: row.get(3)?,
                        phone: row.get(4)?,
                    },
                    row.get(5)?,
                ))
            })
            .map_err(StoreError::op("list guardians"))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(StoreError::op("list guardians"))
    }

    pub fn find_classroom(&self, tenant: &TenantId, name: &str) -> Result<Option<StoredClassroom>> {
        self.conn
            .query_row(
                "SELECT id, name, grade, school_id FROM classrooms WHERE tenant_id = ?1 AND name = ?2",
                params![tenant.as_str(), name],
                |row| {
                    Ok(StoredClassroom {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        grade: row.get(2)?,
                        school_id: row.get(3)?,
                    })
                },
            )
            .optional()
            .map_err(StoreError::op("find classroom"))
    }
}

fn student_from_row(row: &Row<'_>) -> rusqlite::Result<StoredStudent> {
    Ok(StoredStudent {
        id: row.get(0)?,
        external_id: row.get(1)?,
        first: row.get(2)?,
        last: row.get(3)?,
        grade: row.get(4)?,
        pronouns: row.get(5)?,
        pronouns_derived: row.get(6)?,
        iep: row.get(7)?,
        ell: row.get(8)?,
        medical: row.get(9)?,
        school_id: row.get(10)?,
    })
}
