//! Content-based format detection.
//!
//! Users rename files freely, so the extension is only a hint. Magic bytes
//! decide between a spreadsheet container and delimited text.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{IngestError, Result};

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
const ODS_MIMETYPE: &[u8] = b"application/vnd.oasis.opendocument.spreadsheet";

/// Format the caller believes the upload has, usually from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatHint {
    Csv,
    Tsv,
    Xlsx,
    Xls,
    Ods,
}

impl FormatHint {
    /// Maps a file extension (without the dot, any case) to a hint.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" | "txt" => Some(Self::Csv),
            "tsv" | "tab" => Some(Self::Tsv),
            "xlsx" | "xlsm" => Some(Self::Xlsx),
            "xls" => Some(Self::Xls),
            "ods" => Some(Self::Ods),
            _ => None,
        }
    }

    fn is_workbook(self) -> bool {
        matches!(self, Self::Xlsx | Self::Xls | Self::Ods)
    }
}

/// Spreadsheet container family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkbookKind {
    Xlsx,
    Xls,
    Ods,
}

/// Detected physical format of an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Delimited text; the delimiter is sniffed after decoding.
    Delimited,
    Workbook(WorkbookKind),
}

/// Decides the format from content. The hint only matters for logging when
/// it disagrees with the bytes.
pub fn detect_format(bytes: &[u8], hint: Option<FormatHint>) -> Result<SourceFormat> {
    let detected = if bytes.starts_with(ZIP_MAGIC) {
        let head = &bytes[..bytes.len().min(256)];
        if contains(head, ODS_MIMETYPE) {
            SourceFormat::Workbook(WorkbookKind::Ods)
        } else {
            SourceFormat::Workbook(WorkbookKind::Xlsx)
        }
    } else if bytes.starts_with(OLE_MAGIC) {
        SourceFormat::Workbook(WorkbookKind::Xls)
    } else if looks_binary(bytes) {
        return Err(IngestError::UnsupportedFormat {
            reason: "content is binary but not a known spreadsheet container".to_string(),
        });
    } else {
        SourceFormat::Delimited
    };

    if let Some(hint) = hint {
        let hinted_workbook = hint.is_workbook();
        let detected_workbook = matches!(detected, SourceFormat::Workbook(_));
        if hinted_workbook != detected_workbook {
            debug!(?hint, ?detected, "format hint disagrees with content, using content");
        }
    }
    Ok(detected)
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

/// NUL bytes in the head of a non-UTF-16 file mean it is not text.
fn looks_binary(bytes: &[u8]) -> bool {
    if bytes.starts_with(&[0xFF, 0xFE]) || bytes.starts_with(&[0xFE, 0xFF]) {
        return false;
    }
    bytes.iter().take(4096).any(|b| *b == 0)
}
