//! Spreadsheet (xlsx, xls, ods) loading via calamine.

use std::io::Cursor;

use calamine::{Data, ExcelDateTime, Reader, open_workbook_auto_from_rs};
use chrono::NaiveTime;
use tracing::debug;

use crate::error::{IngestError, Result};

/// Reads the first worksheet that contains any data as positional records.
pub fn read_workbook_records(bytes: &[u8]) -> Result<Vec<Vec<String>>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();

    for sheet_name in &sheet_names {
        let range = workbook.worksheet_range(sheet_name)?;
        let (height, width) = range.get_size();
        if height == 0 || width == 0 {
            debug!(sheet = %sheet_name, "skipping empty sheet");
            continue;
        }

        let records: Vec<Vec<String>> = range
            .rows()
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect();
        if records
            .iter()
            .all(|record| record.iter().all(|cell| cell.trim().is_empty()))
        {
            continue;
        }

        debug!(sheet = %sheet_name, rows = height, columns = width, "reading sheet");
        return Ok(records);
    }

    Err(IngestError::NoSheets)
}

/// Renders a cell the way a user would have typed it.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Data::DateTime(dt) => datetime_to_string(dt),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(_) => String::new(),
    }
}

/// Dates render as ISO `YYYY-MM-DD`, with the time only when there is one.
/// Durations keep their serial value.
fn datetime_to_string(dt: &ExcelDateTime) -> String {
    if dt.is_duration() {
        return dt.as_f64().to_string();
    }
    match dt.as_datetime() {
        Some(value) if value.time() == NaiveTime::MIN => value.format("%Y-%m-%d").to_string(),
        Some(value) => value.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => dt.as_f64().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::ExcelDateTimeType;

    #[test]
    fn test_cell_to_string() {
        assert_eq!(cell_to_string(&Data::Float(7.0)), "7");
        assert_eq!(cell_to_string(&Data::Float(7.5)), "7.5");
        assert_eq!(cell_to_string(&Data::Int(12)), "12");
        assert_eq!(cell_to_string(&Data::Bool(true)), "TRUE");
        assert_eq!(cell_to_string(&Data::Empty), "");
        assert_eq!(cell_to_string(&Data::String("Ada".into())), "Ada");
    }

    #[test]
    fn test_date_cells_render_as_iso() {
        let date = |serial| Data::DateTime(ExcelDateTime::new(serial, ExcelDateTimeType::DateTime, false));
        assert_eq!(cell_to_string(&date(45123.0)), "2023-07-16");
        assert_eq!(cell_to_string(&date(45123.5)), "2023-07-16 12:00:00");
        assert_eq!(cell_to_string(&date(36526.0)), "2000-01-01");
    }

    #[test]
    fn test_garbage_container_is_an_error() {
        let result = read_workbook_records(b"PK\x03\x04not really a zip");
        assert!(matches!(result, Err(IngestError::Spreadsheet { .. })));
    }
}
