//! Delimited text (CSV, TSV, semicolon, pipe) reading.

mod decode;
mod reader;

pub use decode::decode_text;
pub use reader::{parse_records, sniff_delimiter};
