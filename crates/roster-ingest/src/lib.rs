//! Roster table reading.
//!
//! This crate turns an uploaded file of unknown layout into a
//! [`SourceTable`](roster_model::SourceTable): an ordered header row plus raw
//! string rows.
//!
//! # Features
//!
//! - **Format sniffing**: spreadsheet containers are recognized by magic bytes,
//!   everything else is treated as delimited text regardless of extension
//! - **Encoding detection**: BOM, UTF-8, then Windows-1252 fallback
//! - **Delimiter sniffing**: tab, semicolon, comma or pipe
//! - **Header detection**: skips title rows above the real header
//! - **Sample values**: distinct previews per column for mapping review
//!
//! # Example
//!
//! ```ignore
//! use roster_ingest::{read_table, FormatHint, ReadOptions};
//!
//! let bytes = std::fs::read("roster.csv")?;
//! let table = read_table(&bytes, Some(FormatHint::Csv), &ReadOptions::default())?;
//! println!("{} columns, {} rows", table.headers().len(), table.len());
//! ```

mod csv;
mod error;
mod format;
mod header;
mod reader;
mod samples;
mod spreadsheet;

// === Error Types ===
pub use error::{IngestError, Result};

// === Reading ===
pub use format::{FormatHint, SourceFormat, WorkbookKind, detect_format};
pub use reader::{HEADER_SCAN_ROWS, MAX_UPLOAD_SIZE, ReadOptions, read_table, read_table_from_path};

// === Lower-level helpers ===
pub use csv::{decode_text, sniff_delimiter};
pub use header::{detect_header_row, normalize_headers};

// === Sample Values ===
pub use samples::sample_values;
