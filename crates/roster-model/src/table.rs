//! Raw tabular input as read from an uploaded file.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::TableError;

/// One raw data row keyed by header.
///
/// Every row of a [`SourceTable`] carries exactly the table's header set;
/// missing cells are stored as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceRow {
    cells: BTreeMap<String, String>,
}

impl SourceRow {
    /// Raw cell value under `header`, if the header exists.
    pub fn get(&self, header: &str) -> Option<&str> {
        self.cells.get(header).map(String::as_str)
    }

    /// Raw cell value, or `""` when the header does not exist.
    pub fn value(&self, header: &str) -> &str {
        self.get(header).unwrap_or("")
    }

    pub fn cells(&self) -> &BTreeMap<String, String> {
        &self.cells
    }

    /// True when every cell is empty after trimming.
    pub fn is_blank(&self) -> bool {
        self.cells.values().all(|value| value.trim().is_empty())
    }
}

/// A header row plus ordered raw data rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceTable {
    headers: Vec<String>,
    rows: Vec<SourceRow>,
}

impl SourceTable {
    /// Builds a table from positional records.
    ///
    /// Records shorter than the header are padded with empty cells; cells
    /// beyond the header width are dropped. Headers must be unique and
    /// non-blank.
    pub fn new(headers: Vec<String>, records: Vec<Vec<String>>) -> Result<Self, TableError> {
        let mut seen = BTreeSet::new();
        for (index, header) in headers.iter().enumerate() {
            if header.trim().is_empty() {
                return Err(TableError::BlankHeader { index });
            }
            if !seen.insert(header.as_str()) {
                return Err(TableError::DuplicateHeader(header.clone()));
            }
        }

        let rows = records
            .into_iter()
            .map(|record| {
                let mut cells = BTreeMap::new();
                for (idx, header) in headers.iter().enumerate() {
                    let value = record.get(idx).cloned().unwrap_or_default();
                    cells.insert(header.clone(), value);
                }
                SourceRow { cells }
            })
            .collect();

        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[SourceRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_header(&self, header: &str) -> bool {
        self.headers.iter().any(|h| h == header)
    }

    /// Non-empty trimmed values under `header`, in row order.
    pub fn non_empty_values<'a>(&'a self, header: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.rows
            .iter()
            .filter_map(move |row| row.get(header))
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}
