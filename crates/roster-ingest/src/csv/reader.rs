//! Delimited text parsing with delimiter sniffing.

use tracing::debug;

use crate::error::Result;

const DELIMITER_CANDIDATES: [u8; 4] = [b'\t', b';', b',', b'|'];
const SNIFF_LINES: usize = 10;

/// Detect the most likely field delimiter by checking consistency across the
/// first few non-blank lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line.
/// The delimiter whose field count on the first line is shared by the most
/// lines wins, weighted by that field count. Falls back to comma.
pub fn sniff_delimiter(content: &str) -> u8 {
    let sample_lines: Vec<&str> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(SNIFF_LINES)
        .collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for delim in DELIMITER_CANDIDATES {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| field_count(line, delim))
            .collect();

        // The most common count among sampled lines is the table width for
        // this delimiter; title rows above the header often disagree with it.
        let Some(width) = modal_count(&counts) else {
            continue;
        };
        if width <= 1 {
            continue;
        }

        let consistent = counts.iter().filter(|&&c| c == width).count() as u64;
        let score = consistent * width as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    debug!(delimiter = %(best as char).escape_default(), "sniffed delimiter");
    best
}

fn field_count(line: &str, delim: u8) -> usize {
    csv::ReaderBuilder::new()
        .delimiter(delim)
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes())
        .records()
        .next()
        .and_then(|r| r.ok())
        .map(|r| r.len())
        .unwrap_or(1)
}

/// Most frequent value; ties go to the larger count.
fn modal_count(counts: &[usize]) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;
    for &candidate in counts {
        let freq = counts.iter().filter(|&&c| c == candidate).count();
        best = match best {
            Some((value, f)) if f > freq || (f == freq && value >= candidate) => Some((value, f)),
            _ => Some((candidate, freq)),
        };
    }
    best.map(|(value, _)| value)
}

/// Parses decoded text into positional records. Records may have differing
/// lengths; shaping happens when the header row is chosen.
pub fn parse_records(content: &str, delimiter: u8) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        records.push(record.iter().map(str::to_string).collect());
    }
    Ok(records)
}
