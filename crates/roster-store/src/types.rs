//! Storage result and record types.

/// Outcome of a create-or-update against a natural key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upserted {
    pub id: String,
    /// `true` when a new row was inserted, `false` when an existing row matched.
    pub created: bool,
}

impl Upserted {
    pub(crate) fn created(id: String) -> Self {
        Self { id, created: true }
    }

    pub(crate) fn matched(id: String) -> Self {
        Self { id, created: false }
    }
}

/// Per-tenant row counts of every entity table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntityCounts {
    pub schools: u64,
    pub students: u64,
    pub guardians: u64,
    pub links: u64,
    pub classrooms: u64,
    pub enrollments: u64,
}

/// A persisted student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredStudent {
    pub id: String,
    pub external_id: Option<String>,
    pub first: String,
    pub last: String,
    pub grade: Option<String>,
    pub pronouns: Option<String>,
    pub pronouns_derived: bool,
    pub iep: bool,
    pub ell: bool,
    pub medical: bool,
    pub school_id: Option<String>,
}

/// A persisted guardian.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredGuardian {
    pub id: String,
    pub dedupe_key: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// A persisted classroom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredClassroom {
    pub id: String,
    pub name: String,
    pub grade: Option<String>,
    pub school_id: Option<String>,
}
