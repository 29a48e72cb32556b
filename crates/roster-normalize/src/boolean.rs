//! Yes/no flag coercion.

/// Tokens (compared case-insensitively) that coerce to `true`.
pub const TRUE_TOKENS: [&str; 7] = ["y", "yes", "true", "1", "t", "✓", "✔"];

/// Coerces a flag cell. Anything outside [`TRUE_TOKENS`], including an
/// empty or missing cell, is `false`.
pub fn coerce_bool(raw: Option<&str>) -> bool {
    let Some(value) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return false;
    };
    let lowered = value.to_lowercase();
    TRUE_TOKENS.contains(&lowered.as_str())
}
