//! The fixed set of semantic fields a roster import can fill.
//!
//! Identifiers are the camelCase names used in mapping files
//! (`first`, `studentExternalId`, `guardian2Phone`, ...).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MappingError;

/// Declared value kind of a target field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// Free text, trimmed.
    Text,
    /// Yes/no flag.
    Boolean,
    /// Gender token, canonicalized where recognized.
    Gender,
    /// Opaque identifier used as a natural key.
    Identifier,
}

/// Which guardian a guardian field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardianSlot {
    First,
    Second,
}

impl GuardianSlot {
    /// 1-based slot number.
    pub fn number(self) -> u8 {
        match self {
            GuardianSlot::First => 1,
            GuardianSlot::Second => 2,
        }
    }
}

/// A semantic target field of the roster import.
///
/// Declaration order is the catalog order; it drives deterministic iteration
/// everywhere a mapping or proposal is printed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum TargetField {
    First,
    Last,
    StudentExternalId,
    Grade,
    StudentEmail,
    Gender,
    Pronouns,
    Iep,
    Ell,
    Medical,
    School,
    Classroom,
    Guardian1Name,
    Guardian1Email,
    Guardian1Phone,
    Guardian1Relationship,
    Guardian2Name,
    Guardian2Email,
    Guardian2Phone,
    Guardian2Relationship,
}

impl TargetField {
    /// Every field, in catalog order.
    pub const ALL: [TargetField; 20] = [
        TargetField::First,
        TargetField::Last,
        TargetField::StudentExternalId,
        TargetField::Grade,
        TargetField::StudentEmail,
        TargetField::Gender,
        TargetField::Pronouns,
        TargetField::Iep,
        TargetField::Ell,
        TargetField::Medical,
        TargetField::School,
        TargetField::Classroom,
        TargetField::Guardian1Name,
        TargetField::Guardian1Email,
        TargetField::Guardian1Phone,
        TargetField::Guardian1Relationship,
        TargetField::Guardian2Name,
        TargetField::Guardian2Email,
        TargetField::Guardian2Phone,
        TargetField::Guardian2Relationship,
    ];

    /// Identifier as used in mapping files.
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetField::First => "first",
            TargetField::Last => "last",
            TargetField::StudentExternalId => "studentExternalId",
            TargetField::Grade => "grade",
            TargetField::StudentEmail => "studentEmail",
            TargetField::Gender => "gender",
            TargetField::Pronouns => "pronouns",
            TargetField::Iep => "iep",
            TargetField::Ell => "ell",
            TargetField::Medical => "medical",
            TargetField::School => "school",
            TargetField::Classroom => "classroom",
            TargetField::Guardian1Name => "guardian1Name",
            TargetField::Guardian1Email => "guardian1Email",
            TargetField::Guardian1Phone => "guardian1Phone",
            TargetField::Guardian1Relationship => "guardian1Relationship",
            TargetField::Guardian2Name => "guardian2Name",
            TargetField::Guardian2Email => "guardian2Email",
            TargetField::Guardian2Phone => "guardian2Phone",
            TargetField::Guardian2Relationship => "guardian2Relationship",
        }
    }

    /// Human-readable label for review screens.
    pub fn label(&self) -> &'static str {
        match self {
            TargetField::First => "First name",
            TargetField::Last => "Last name",
            TargetField::StudentExternalId => "Student ID",
            TargetField::Grade => "Grade",
            TargetField::StudentEmail => "Student email",
            TargetField::Gender => "Gender",
            TargetField::Pronouns => "Pronouns",
            TargetField::Iep => "IEP",
            TargetField::Ell => "ELL",
            TargetField::Medical => "Medical",
            TargetField::School => "School",
            TargetField::Classroom => "Classroom",
            TargetField::Guardian1Name => "Guardian 1 name",
            TargetField::Guardian1Email => "Guardian 1 email",
            TargetField::Guardian1Phone => "Guardian 1 phone",
            TargetField::Guardian1Relationship => "Guardian 1 relationship",
            TargetField::Guardian2Name => "Guardian 2 name",
            TargetField::Guardian2Email => "Guardian 2 email",
            TargetField::Guardian2Phone => "Guardian 2 phone",
            TargetField::Guardian2Relationship => "Guardian 2 relationship",
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            TargetField::Iep | TargetField::Ell | TargetField::Medical => ValueKind::Boolean,
            TargetField::Gender => ValueKind::Gender,
            TargetField::StudentExternalId => ValueKind::Identifier,
            _ => ValueKind::Text,
        }
    }

    /// First and last name must be present for a row to be imported.
    pub fn is_required(&self) -> bool {
        matches!(self, TargetField::First | TargetField::Last)
    }

    /// The guardian this field describes, if it is a guardian field.
    pub fn guardian_slot(&self) -> Option<GuardianSlot> {
        match self {
            TargetField::Guardian1Name
            | TargetField::Guardian1Email
            | TargetField::Guardian1Phone
            | TargetField::Guardian1Relationship => Some(GuardianSlot::First),
            TargetField::Guardian2Name
            | TargetField::Guardian2Email
            | TargetField::Guardian2Phone
            | TargetField::Guardian2Relationship => Some(GuardianSlot::Second),
            _ => None,
        }
    }

    /// True for fields that describe the student rather than a guardian,
    /// school or classroom.
    pub fn is_student_field(&self) -> bool {
        self.guardian_slot().is_none()
            && !matches!(self, TargetField::School | TargetField::Classroom)
    }

    /// The name/email/phone/relationship fields of one guardian slot.
    pub fn guardian_fields(slot: GuardianSlot) -> [TargetField; 4] {
        match slot {
            GuardianSlot::First => [
                TargetField::Guardian1Name,
                TargetField::Guardian1Email,
                TargetField::Guardian1Phone,
                TargetField::Guardian1Relationship,
            ],
            GuardianSlot::Second => [
                TargetField::Guardian2Name,
                TargetField::Guardian2Email,
                TargetField::Guardian2Phone,
                TargetField::Guardian2Relationship,
            ],
        }
    }
}

impl fmt::Display for TargetField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetField {
    type Err = MappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        TargetField::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| MappingError::UnknownField(trimmed.to_string()))
    }
}
