#![deny(unsafe_code)]

//! SQLite storage for imported rosters.
//!
//! Schools, students, guardians, guardian links, classrooms and enrollments
//! are tenant-scoped and keyed by natural keys enforced as `UNIQUE`
//! constraints. Writes go through a [`StoreTx`], one per imported row.

mod error;
mod schema;
mod store;
mod tx;
mod types;

pub use error::{Result, StoreError};
pub use store::{DEFAULT_BUSY_TIMEOUT, RosterStore};
pub use tx::StoreTx;
pub use types::{EntityCounts, StoredClassroom, StoredGuardian, StoredStudent, Upserted};
