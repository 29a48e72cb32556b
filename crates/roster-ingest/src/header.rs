//! Header row detection and normalization.

use std::collections::BTreeSet;

/// Picks the header row among the first `scan_rows` records.
///
/// Exported spreadsheets often carry title or date rows above the real
/// header. The row with the most non-empty cells wins; ties go to the
/// earliest row. Returns `None` when every scanned row is blank.
pub fn detect_header_row(records: &[Vec<String>], scan_rows: usize) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;
    for (idx, record) in records.iter().take(scan_rows.max(1)).enumerate() {
        let filled = record.iter().filter(|cell| !cell.trim().is_empty()).count();
        if filled == 0 {
            continue;
        }
        match best {
            Some((_, count)) if count >= filled => {}
            _ => best = Some((idx, filled)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// Turns raw header cells into unique, non-blank header names.
///
/// - cells are trimmed
/// - trailing blank cells are dropped
/// - interior blank cells become `Column N` (1-based position)
/// - repeated names get ` (2)`, ` (3)`, ... suffixes
pub fn normalize_headers(raw: &[String]) -> Vec<String> {
    let mut cells: Vec<String> = raw.iter().map(|cell| cell.trim().to_string()).collect();
    while cells.last().is_some_and(String::is_empty) {
        cells.pop();
    }

    let mut seen = BTreeSet::new();
    let mut headers = Vec::with_capacity(cells.len());
    for (idx, cell) in cells.into_iter().enumerate() {
        let base = if cell.is_empty() {
            format!("Column {}", idx + 1)
        } else {
            cell
        };
        let mut name = base.clone();
        let mut n = 2;
        while !seen.insert(name.clone()) {
            name = format!("{base} ({n})");
            n += 1;
        }
        headers.push(name);
    }
    headers
}
