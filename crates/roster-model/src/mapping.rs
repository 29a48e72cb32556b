//! Field-to-column assignments.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{MappingError, Result};
use crate::field::TargetField;
use crate::table::SourceRow;

/// A partial, injective assignment of target fields to source headers.
///
/// No two fields ever share a header. Fields absent from the mapping are
/// "not present in this table". The mapping serializes as a JSON object keyed
/// by field identifier, e.g. `{"first": "Student First"}`, and rejects
/// non-injective objects on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<TargetField, String>",
    into = "BTreeMap<TargetField, String>"
)]
pub struct ColumnMapping {
    assignments: BTreeMap<TargetField, String>,
}

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns `header` to `field`, replacing any previous header of `field`.
    ///
    /// Fails if `header` already belongs to a different field.
    pub fn assign(&mut self, field: TargetField, header: impl Into<String>) -> Result<()> {
        let header = header.into();
        if let Some(owner) = self.field_for(&header)
            && owner != field
        {
            return Err(MappingError::ColumnAlreadyUsed {
                column: header,
                field: owner,
            });
        }
        self.assignments.insert(field, header);
        Ok(())
    }

    /// Removes the assignment of `field`, returning the header it had.
    pub fn clear(&mut self, field: TargetField) -> Option<String> {
        self.assignments.remove(&field)
    }

    /// Header assigned to `field`.
    pub fn header(&self, field: TargetField) -> Option<&str> {
        self.assignments.get(&field).map(String::as_str)
    }

    /// Field that owns `header`.
    pub fn field_for(&self, header: &str) -> Option<TargetField> {
        self.assignments
            .iter()
            .find(|(_, h)| h.as_str() == header)
            .map(|(field, _)| *field)
    }

    pub fn is_mapped(&self, field: TargetField) -> bool {
        self.assignments.contains_key(&field)
    }

    /// Assignments in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (TargetField, &str)> {
        self.assignments.iter().map(|(f, h)| (*f, h.as_str()))
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Checks that every assigned header exists in `headers`.
    pub fn validate_against(&self, headers: &[String]) -> Result<()> {
        for header in self.assignments.values() {
            if !headers.iter().any(|h| h == header) {
                return Err(MappingError::ColumnNotFound(header.clone()));
            }
        }
        Ok(())
    }

    /// Raw cell of `field` in `row`; `None` when unmapped.
    pub fn raw<'a>(&self, row: &'a SourceRow, field: TargetField) -> Option<&'a str> {
        self.header(field).and_then(|header| row.get(header))
    }
}

impl TryFrom<BTreeMap<TargetField, String>> for ColumnMapping {
    type Error = MappingError;

    fn try_from(value: BTreeMap<TargetField, String>) -> Result<Self> {
        let mut mapping = ColumnMapping::new();
        for (field, header) in value {
            mapping.assign(field, header)?;
        }
        Ok(mapping)
    }
}

impl From<ColumnMapping> for BTreeMap<TargetField, String> {
    fn from(value: ColumnMapping) -> Self {
        value.assignments
    }
}
