use std::fmt;

use crate::patterns::FLOAT_PATTERN;

/// Data type inferred for a cell or a whole column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Type {
    /// Missing value.
    Null,
    /// `true` / `false`.
    Boolean,
    /// Whole number that fits in an `i64`.
    Integer,
    /// Floating point number.
    Float,
    /// Text (fallback type).
    #[default]
    Text,
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Null => write!(f, "null"),
            Type::Boolean => write!(f, "bool"),
            Type::Integer => write!(f, "int64"),
            Type::Float => write!(f, "float64"),
            Type::Text => write!(f, "text"),
        }
    }
}

impl Type {
    /// Merge two types, returning the most general type that can represent both.
    pub fn merge(self, other: Type) -> Type {
        if self == other {
            return self;
        }

        // Null can be promoted to any type
        if self == Type::Null {
            return other;
        }
        if other == Type::Null {
            return self;
        }

        match (self, other) {
            (Type::Integer, Type::Float) | (Type::Float, Type::Integer) => Type::Float,
            // Everything else becomes Text
            _ => Type::Text,
        }
    }
}

/// Detect the type of a single raw text cell.
///
/// Only the empty string is null; whitespace-only cells and placeholder
/// words such as `N/A` are text.
pub fn detect_cell_type(value: &str) -> Type {
    if value.is_empty() {
        return Type::Null;
    }

    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Type::Text;
    }

    if is_integer(trimmed) {
        return Type::Integer;
    }

    if trimmed.eq_ignore_ascii_case("true") || trimmed.eq_ignore_ascii_case("false") {
        return Type::Boolean;
    }

    if FLOAT_PATTERN.is_match(trimmed) && trimmed.parse::<f64>().is_ok() {
        return Type::Float;
    }

    Type::Text
}

/// Whole numbers that round-trip through `i64`.
#[inline]
fn is_integer(s: &str) -> bool {
    let digits = s.strip_prefix(['-', '+']).unwrap_or(s);
    !digits.is_empty()
        && digits.len() <= 19
        && digits.bytes().all(|b| b.is_ascii_digit())
        && s.parse::<i64>().is_ok()
}

/// Infer one column type from raw text cells.
pub fn infer_column_type<'a>(cells: impl IntoIterator<Item = &'a str>) -> Type {
    cells
        .into_iter()
        .fold(Type::Null, |merged, cell| merged.merge(detect_cell_type(cell)))
}
