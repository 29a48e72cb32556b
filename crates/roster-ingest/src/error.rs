//! Error types for roster table reading.
//!
//! Every variant means the upload cannot be turned into a table at all; the
//! import is aborted before any row is processed.

use std::path::PathBuf;
use thiserror::Error;

use roster_model::TableError;

/// Errors that can occur while reading an uploaded roster file.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File Errors ===
    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Upload has zero bytes.
    #[error("file is empty")]
    EmptyFile,

    /// Upload exceeds the configured size limit.
    #[error("file is too large ({size} bytes, limit {max_size} bytes)")]
    FileTooLarge { size: u64, max_size: u64 },

    /// Content is neither delimited text nor a readable spreadsheet.
    #[error("unsupported file format: {reason}")]
    UnsupportedFormat { reason: String },

    // === Parsing Errors ===
    /// Delimited text could not be parsed.
    #[error("failed to parse delimited text: {message}")]
    CsvParse { message: String },

    /// Spreadsheet container could not be opened or read.
    #[error("failed to read spreadsheet: {message}")]
    Spreadsheet { message: String },

    /// Workbook contains no sheet with data.
    #[error("spreadsheet contains no data")]
    NoSheets,

    // === Shape Errors ===
    /// The detected header row has no non-empty cell.
    #[error("header row is blank")]
    BlankHeader,

    /// Header row found but no data rows follow it.
    #[error("file has a header row but no data rows")]
    NoDataRows,

    /// Header row could not form a valid table.
    #[error("invalid header row: {0}")]
    Table(#[from] TableError),
}

impl From<csv::Error> for IngestError {
    fn from(err: csv::Error) -> Self {
        Self::CsvParse {
            message: err.to_string(),
        }
    }
}

impl From<calamine::Error> for IngestError {
    fn from(err: calamine::Error) -> Self {
        Self::Spreadsheet {
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
