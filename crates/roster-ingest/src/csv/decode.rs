//! Text decoding for delimited uploads.

use std::borrow::Cow;

use encoding_rs::{Encoding, WINDOWS_1252};

/// Decodes raw bytes to text.
///
/// A byte-order mark wins (UTF-8, UTF-16 LE/BE). Without one, valid UTF-8 is
/// used as is and anything else falls back to Windows-1252, which is what
/// spreadsheet programs export on most school machines.
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return text;
    }
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            let (text, _, _) = WINDOWS_1252.decode(bytes);
            text
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_utf8() {
        assert_eq!(decode_text("Zoë,Brontë".as_bytes()), "Zoë,Brontë");
    }

    #[test]
    fn test_utf8_bom_is_stripped() {
        assert_eq!(decode_text(b"\xEF\xBB\xBFA,B"), "A,B");
    }

    #[test]
    fn test_utf16_le_with_bom() {
        let bytes = [0xFF, 0xFE, b'A', 0x00, b',', 0x00, b'B', 0x00];
        assert_eq!(decode_text(&bytes), "A,B");
    }

    #[test]
    fn test_windows_1252_fallback() {
        // "José" with é encoded as a single 0xE9 byte
        assert_eq!(decode_text(b"Jos\xE9"), "José");
    }
}
