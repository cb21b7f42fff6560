//! Compiled regex patterns and token vocabularies shared by loading and analysis.

use regex::Regex;

/// Pattern for floating point numbers (various formats).
pub static FLOAT_PATTERN: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r"^[-+]?(?:\d+\.?\d*|\d*\.?\d+)(?:[eE][-+]?\d+)?$").expect("Invalid float pattern")
});

/// Any character that is neither a word character nor whitespace.
pub static SPECIAL_CHAR_PATTERN: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"[^\w\s]").expect("Invalid special character pattern"));

/// Whitespace runs separating fields of `.txt` datasets.
pub static WHITESPACE_RUN_PATTERN: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace pattern"));

/// Tokens conventionally used to stand in for missing data.
///
/// Matching is exact and case-sensitive against the trimmed cell text.
pub const PLACEHOLDERS: &[&str] = &[
    "", "N/A", "NA", "None", "none", "unknown", "Unknown", "-", "TBD", "tbd", "0000", "null",
    "NULL", "n/a",
];

/// Returns true if the trimmed text is a placeholder token.
#[inline]
pub fn is_placeholder(value: &str) -> bool {
    PLACEHOLDERS.contains(&value.trim())
}
