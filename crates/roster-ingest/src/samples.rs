//! Sample value extraction for mapping review.

use std::collections::BTreeSet;

use roster_model::SourceTable;

/// Gets up to `limit` distinct non-empty values under `header`, in the order
/// they first appear.
pub fn sample_values(table: &SourceTable, header: &str, limit: usize) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut samples = Vec::new();
    for value in table.non_empty_values(header) {
        if samples.len() >= limit {
            break;
        }
        if seen.insert(value) {
            samples.push(value.to_string());
        }
    }
    samples
}
