//! Proposal result types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use roster_model::{ColumnMapping, TargetField};

use crate::catalog::CatalogProfile;
use crate::score::ColumnScore;

/// Tunables for the mapping engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperOptions {
    /// Minimum confidence for an automatic assignment.
    pub min_confidence: f32,
    /// Non-empty cells sampled per column for value detection.
    pub sample_limit: usize,
    /// Distinct sample values kept per mapped field for review.
    pub preview_samples: usize,
    /// Catalog subset proposals are made against.
    pub profile: CatalogProfile,
}

impl Default for MapperOptions {
    fn default() -> Self {
        Self {
            min_confidence: 0.5,
            sample_limit: 50,
            preview_samples: 3,
            profile: CatalogProfile::Full,
        }
    }
}

/// An automatic header-to-field assignment.
#[derive(Debug, Clone, Serialize)]
pub struct FieldAssignment {
    pub field: TargetField,
    pub header: String,
    pub score: ColumnScore,
}

/// Why the proposal flagged a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// A required field has no header above the threshold.
    MissingRequired,
    /// The best header for the field scored below the threshold.
    BelowThreshold,
    /// Another header scored nearly as well as the chosen one.
    Contested,
    /// The field's best header was taken by a field that only narrowly beat it.
    Displaced,
}

/// A proposal entry that needs a human look.
#[derive(Debug, Clone, Serialize)]
pub struct MappingAmbiguityWarning {
    pub field: TargetField,
    pub kind: WarningKind,
    /// Headers involved, best first.
    pub headers: Vec<String>,
    pub message: String,
}

/// The engine's proposal for one table.
///
/// `mapping` is injective: no header feeds two fields.
#[derive(Debug, Clone, Serialize)]
pub struct MappingProposal {
    pub mapping: ColumnMapping,
    /// One entry per mapped field, in catalog order.
    pub assignments: Vec<FieldAssignment>,
    /// Distinct sample values per mapped field.
    pub samples: BTreeMap<TargetField, Vec<String>>,
    pub warnings: Vec<MappingAmbiguityWarning>,
    /// Headers not assigned to any field, in source order.
    pub unmapped_headers: Vec<String>,
    pub catalog_version: u32,
}

impl MappingProposal {
    pub fn assignment(&self, field: TargetField) -> Option<&FieldAssignment> {
        self.assignments.iter().find(|a| a.field == field)
    }

    /// Confidence of the assignment for `field`, if mapped.
    pub fn confidence(&self, field: TargetField) -> Option<f32> {
        self.assignment(field).map(|a| a.score.confidence)
    }

    /// Whether every required field is mapped.
    pub fn is_complete(&self) -> bool {
        TargetField::ALL
            .iter()
            .filter(|f| f.is_required())
            .all(|f| self.mapping.is_mapped(*f))
    }
}
