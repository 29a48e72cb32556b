//! Header text normalization.

/// Normalizes a header for pattern matching.
///
/// - splits camelCase and letter/digit boundaries (`Parent2Email` → `parent 2 email`)
/// - `#` reads as "number"
/// - every other non-alphanumeric character becomes a separator
/// - lowercases and collapses whitespace
pub fn normalize_header(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 8);
    let mut prev: Option<char> = None;
    for ch in raw.trim().chars() {
        if ch == '#' {
            out.push_str(" number ");
            prev = None;
            continue;
        }
        if !ch.is_alphanumeric() {
            out.push(' ');
            prev = None;
            continue;
        }
        if let Some(p) = prev {
            let camel = p.is_lowercase() && ch.is_uppercase();
            let digit_edge = p.is_alphabetic() != ch.is_alphabetic();
            if camel || digit_edge {
                out.push(' ');
            }
        }
        out.extend(ch.to_lowercase());
        prev = Some(ch);
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}
