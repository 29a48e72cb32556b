//! Upload-to-table entry points.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use roster_model::SourceTable;

use crate::csv::{decode_text, parse_records, sniff_delimiter};
use crate::error::{IngestError, Result};
use crate::format::{FormatHint, SourceFormat, detect_format};
use crate::header::{detect_header_row, normalize_headers};
use crate::spreadsheet::read_workbook_records;

/// Maximum upload size (50 MB default).
pub const MAX_UPLOAD_SIZE: u64 = 50 * 1024 * 1024;

/// Number of leading rows considered when looking for the header.
pub const HEADER_SCAN_ROWS: usize = 5;

/// Options for [`read_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadOptions {
    /// Uploads larger than this are rejected.
    pub max_upload_bytes: u64,
    /// Leading rows scanned for the header row.
    pub header_scan_rows: usize,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            max_upload_bytes: MAX_UPLOAD_SIZE,
            header_scan_rows: HEADER_SCAN_ROWS,
        }
    }
}

/// Reads an uploaded file into a [`SourceTable`].
///
/// The format is detected from content; `hint` is advisory. Fails when the
/// upload is empty, unreadable, has a blank header row, or has no data rows.
pub fn read_table(
    bytes: &[u8],
    hint: Option<FormatHint>,
    options: &ReadOptions,
) -> Result<SourceTable> {
    if bytes.is_empty() {
        return Err(IngestError::EmptyFile);
    }
    let size = bytes.len() as u64;
    if size > options.max_upload_bytes {
        return Err(IngestError::FileTooLarge {
            size,
            max_size: options.max_upload_bytes,
        });
    }

    let format = detect_format(bytes, hint)?;
    let records = match format {
        SourceFormat::Delimited => {
            let text = decode_text(bytes);
            let delimiter = sniff_delimiter(&text);
            parse_records(&text, delimiter)?
        }
        SourceFormat::Workbook(kind) => {
            debug!(?kind, "reading spreadsheet");
            read_workbook_records(bytes)?
        }
    };

    let table = shape_table(records, options.header_scan_rows)?;
    info!(
        ?format,
        columns = table.headers().len(),
        rows = table.len(),
        "read roster table"
    );
    Ok(table)
}

/// Reads a file from disk, using its extension as the format hint.
pub fn read_table_from_path(path: &Path, options: &ReadOptions) -> Result<SourceTable> {
    let metadata = std::fs::metadata(path).map_err(|source| IngestError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    if metadata.len() > options.max_upload_bytes {
        return Err(IngestError::FileTooLarge {
            size: metadata.len(),
            max_size: options.max_upload_bytes,
        });
    }
    let bytes = std::fs::read(path).map_err(|source| IngestError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let hint = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(FormatHint::from_extension);
    read_table(&bytes, hint, options)
}

/// Chooses the header row and builds the table from the rows below it.
fn shape_table(records: Vec<Vec<String>>, scan_rows: usize) -> Result<SourceTable> {
    let header_idx = detect_header_row(&records, scan_rows).ok_or(IngestError::BlankHeader)?;
    if header_idx > 0 {
        debug!(skipped = header_idx, "skipping rows above header");
    }

    let headers = normalize_headers(&records[header_idx]);
    if headers.is_empty() {
        return Err(IngestError::BlankHeader);
    }

    let width = headers.len();
    let data: Vec<Vec<String>> = records
        .into_iter()
        .skip(header_idx + 1)
        .filter(|record| record.iter().any(|cell| !cell.trim().is_empty()))
        .inspect(|record| {
            if record.len() > width
                && record[width..].iter().any(|cell| !cell.trim().is_empty())
            {
                debug!(
                    extra = record.len() - width,
                    "ignoring cells beyond header width"
                );
            }
        })
        .collect();

    if data.is_empty() {
        return Err(IngestError::NoDataRows);
    }

    Ok(SourceTable::new(headers, data)?)
}
