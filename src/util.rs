// Small parsing and text helpers shared by the normalizer, the coercion
// stage and the value cleaner.
//
// Everything here is forgiving: bad input yields `None` (or is passed
// through untouched), never an error.
use num_format::{Locale, ToFormattedString};

/// Cell values that mean "nothing here", compared case-insensitively after
/// trimming.
pub const SENTINEL_TOKENS: &[&str] = &["", "nan", "none", "null", "na", "n/a", "-", "--"];

pub fn is_sentinel(s: &str) -> bool {
    let s = s.trim();
    SENTINEL_TOKENS.iter().any(|t| s.eq_ignore_ascii_case(t))
}

/// Parse a cell into a finite `f64`.
///
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters, which also keeps
///   `nan`/`inf` spellings out.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Numeric coercion to an integer: `"2023"`, `"2023.0"` and `" 2023 "` all
/// become `2023`. Fractions are truncated toward zero.
pub fn parse_i64_safe(s: Option<&str>) -> Option<i64> {
    // `?` propagates `None` early if the option is missing.
    let v = parse_f64_safe(s)?;
    if v.abs() >= i64::MAX as f64 {
        return None;
    }
    Some(v.trunc() as i64)
}

/// Non-negative count; negative or unparseable input becomes 0.
pub fn parse_count(s: Option<&str>) -> u64 {
    parse_i64_safe(s).map(|v| v.max(0) as u64).unwrap_or(0)
}

/// Word-initial characters uppercased, all other letters lowercased. A word
/// starts after any character that is not a letter, so `"pasar ciputat"`
/// becomes `"Pasar Ciputat"` and `"o'neil"` becomes `"O'Neil"`.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Thin wrapper around `num-format` for counts in console output
    // (e.g., `1,204 UTTP`).
    n.to_formatted_string(&Locale::en)
}
