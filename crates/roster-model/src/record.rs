//! Normalized per-row records handed to the commit engine.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::field::GuardianSlot;

/// Tenant scope for every persisted entity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Student gender as recorded on the roster.
///
/// Recognized tokens are canonicalized; anything else is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    NonBinary,
    Other(String),
}

impl Gender {
    /// Parses a trimmed, non-empty gender cell.
    pub fn parse(raw: &str) -> Option<Gender> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        let token = trimmed.to_lowercase();
        let gender = match token.as_str() {
            "m" | "male" | "boy" | "man" => Gender::Male,
            "f" | "female" | "girl" | "woman" => Gender::Female,
            "nb" | "x" | "nonbinary" | "non-binary" | "non binary" | "enby" => Gender::NonBinary,
            _ => Gender::Other(trimmed.to_string()),
        };
        Some(gender)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::NonBinary => "nonbinary",
            Gender::Other(value) => value,
        }
    }

    /// Pronoun set implied by the gender, if any.
    pub fn derived_pronouns(&self) -> Option<&'static str> {
        match self {
            Gender::Male => Some("he/him/his"),
            Gender::Female => Some("she/her/her"),
            Gender::NonBinary => Some("they/them/their"),
            Gender::Other(_) => None,
        }
    }
}

/// Normalized student data for one roster row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedStudent {
    pub tenant_id: TenantId,
    pub external_id: Option<String>,
    pub first: String,
    pub last: String,
    pub grade: Option<String>,
    pub email: Option<String>,
    pub gender: Option<Gender>,
    pub pronouns: Option<String>,
    /// The pronouns were derived from gender rather than read from a cell.
    pub pronouns_derived: bool,
    /// Flags are `None` when their column is not mapped.
    pub iep: Option<bool>,
    pub ell: Option<bool>,
    pub medical: Option<bool>,
    pub school_name: Option<String>,
    pub classroom_name: Option<String>,
}

impl NormalizedStudent {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first, self.last)
    }
}

/// Natural-key basis for a guardian.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GuardianKey {
    /// Lower-cased email address.
    Email(String),
    /// No email: the key is derived from the owning student and the
    /// guardian's name once the student id is known.
    Synthetic { name: String },
}

impl GuardianKey {
    /// The stored dedupe key for this guardian.
    pub fn resolve(&self, student_id: &str) -> String {
        match self {
            GuardianKey::Email(email) => email.clone(),
            GuardianKey::Synthetic { name } => {
                let slug = name
                    .split_whitespace()
                    .map(str::to_lowercase)
                    .collect::<Vec<_>>()
                    .join("-");
                format!("synthetic:{student_id}:{slug}")
            }
        }
    }
}

/// A guardian attached to one normalized student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedGuardian {
    pub slot: GuardianSlot,
    pub name: String,
    /// The name was derived (from the email or the slot), not read from a cell.
    pub synthesized_name: bool,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub relationship: Option<String>,
    pub key: GuardianKey,
}

/// Output of normalizing one row: a student and up to two guardians.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRow {
    pub student: NormalizedStudent,
    pub guardians: Vec<NormalizedGuardian>,
}
