//! Cell access helpers.

use roster_model::{ColumnMapping, SourceRow, TargetField};

/// Trimmed value of a mapped cell; `None` when unmapped or blank.
pub(crate) fn cell<'a>(
    row: &'a SourceRow,
    mapping: &ColumnMapping,
    field: TargetField,
) -> Option<&'a str> {
    mapping
        .raw(row, field)
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
