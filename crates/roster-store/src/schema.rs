//! Table definitions.
//!
//! Every natural key is a `UNIQUE` constraint so concurrent imports converge
//! at the storage layer. `students.external_id` is nullable; SQLite treats
//! NULLs as distinct, so students without an external id never collide.

pub(crate) const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS schools(
    id TEXT PRIMARY KEY,
    tenant_id TEXT NOT NULL,
    name TEXT NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE(tenant_id, name)
);

CREATE TABLE IF NOT EXISTS students(
    id TEXT PRIMARY KEY,
    tenant_id TEXT NOT NULL,
    external_id TEXT,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    grade TEXT,
    email TEXT,
    gender TEXT,
    pronouns TEXT,
    pronouns_derived INTEGER NOT NULL DEFAULT 0,
    iep INTEGER NOT NULL DEFAULT 0,
    ell INTEGER NOT NULL DEFAULT 0,
    medical INTEGER NOT NULL DEFAULT 0,
    school_id TEXT REFERENCES schools(id),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE(tenant_id, external_id)
);

CREATE TABLE IF NOT EXISTS guardians(
    id TEXT PRIMARY KEY,
    tenant_id TEXT NOT NULL,
    dedupe_key TEXT NOT NULL,
    name TEXT NOT NULL,
    email TEXT,
    phone TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE(tenant_id, dedupe_key)
);

CREATE TABLE IF NOT EXISTS student_guardians(
    tenant_id TEXT NOT NULL,
    student_id TEXT NOT NULL REFERENCES students(id),
    guardian_id TEXT NOT NULL REFERENCES guardians(id),
    relationship TEXT,
    created_at TEXT NOT NULL,
    PRIMARY KEY(tenant_id, student_id, guardian_id)
);

CREATE TABLE IF NOT EXISTS classrooms(
    id TEXT PRIMARY KEY,
    tenant_id TEXT NOT NULL,
    name TEXT NOT NULL,
    grade TEXT,
    school_id TEXT REFERENCES schools(id),
    created_at TEXT NOT NULL,
    UNIQUE(tenant_id, name)
);

CREATE TABLE IF NOT EXISTS enrollments(
    tenant_id TEXT NOT NULL,
    classroom_id TEXT NOT NULL REFERENCES classrooms(id),
    student_id TEXT NOT NULL REFERENCES students(id),
    created_at TEXT NOT NULL,
    PRIMARY KEY(tenant_id, classroom_id, student_id)
);

CREATE INDEX IF NOT EXISTS idx_student_guardians_guardian ON student_guardians(guardian_id);
CREATE INDEX IF NOT EXISTS idx_enrollments_student ON enrollments(student_id);
";
