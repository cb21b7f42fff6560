//! Supported file formats and their readers and writers.
//!
//! Formats are resolved from file extensions through a single lookup table,
//! so supporting another extension is a new table row.

pub mod columnar;
pub mod delimited;
pub mod json;
pub mod spreadsheet;

use std::fmt;
use std::path::Path;

use crate::error::{DatascopeError, Result};

/// Field separator of a delimited text file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Delimiter {
    /// A single byte such as `,`, `\t` or `;`.
    Byte(u8),
    /// One or more whitespace characters.
    Whitespace,
}

impl Delimiter {
    pub const COMMA: Delimiter = Delimiter::Byte(b',');
    pub const TAB: Delimiter = Delimiter::Byte(b'\t');

    /// Parse a caller-supplied delimiter: a single character, `\t`, or
    /// `whitespace`.
    pub fn parse(raw: &str) -> Result<Self> {
        match raw {
            "\\t" | "tab" => Ok(Delimiter::TAB),
            "\\s+" | "whitespace" => Ok(Delimiter::Whitespace),
            s if s.len() == 1 => Ok(Delimiter::Byte(s.as_bytes()[0])),
            _ => Err(DatascopeError::Validation(format!(
                "delimiter must be a single ASCII character, got {raw:?}"
            ))),
        }
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delimiter::Byte(b) => write!(f, "{:?}", *b as char),
            Delimiter::Whitespace => write!(f, "whitespace"),
        }
    }
}

/// Family of a dataset file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Line-oriented text with the given default separator.
    DelimitedText(Delimiter),
    /// Excel workbook (first sheet).
    Spreadsheet,
    /// JSON records or columns.
    Json,
    /// Apache Parquet.
    Columnar,
}

/// Extension to format mapping, lowercase extensions without the dot.
const FORMATS: &[(&str, Format)] = &[
    ("csv", Format::DelimitedText(Delimiter::COMMA)),
    ("tsv", Format::DelimitedText(Delimiter::TAB)),
    ("txt", Format::DelimitedText(Delimiter::Whitespace)),
    ("xls", Format::Spreadsheet),
    ("xlsx", Format::Spreadsheet),
    ("json", Format::Json),
    ("parquet", Format::Columnar),
    ("pq", Format::Columnar),
];

/// Conversion targets and the extension written for them.
const TARGETS: &[(&str, Format)] = &[
    ("csv", Format::DelimitedText(Delimiter::COMMA)),
    ("tsv", Format::DelimitedText(Delimiter::TAB)),
    ("json", Format::Json),
    ("parquet", Format::Columnar),
    ("xlsx", Format::Spreadsheet),
];

impl Format {
    /// Look up a lowercase or mixed-case extension (no leading dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        FORMATS
            .iter()
            .find(|(e, _)| *e == ext)
            .map(|(_, format)| *format)
    }

    /// Resolve the format of a dataset path from its extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        Self::from_extension(ext).ok_or_else(|| {
            DatascopeError::Format(format!(
                "{} (extension {:?})",
                path.display(),
                if ext.is_empty() { "<none>" } else { ext }
            ))
        })
    }

    /// Resolve a conversion target such as `"parquet"` or `".xlsx"`.
    ///
    /// Returns the format and the extension to write.
    pub fn target(name: &str) -> Result<(Self, &'static str)> {
        let name = name.trim().trim_start_matches('.').to_ascii_lowercase();
        TARGETS
            .iter()
            .find(|(e, _)| *e == name)
            .map(|(e, format)| (*format, *e))
            .ok_or_else(|| DatascopeError::Format(format!("cannot write target format {name:?}")))
    }

    /// Label used in progress messages.
    pub fn label(&self) -> &'static str {
        match self {
            Format::DelimitedText(_) => "text",
            Format::Spreadsheet => "Excel",
            Format::Json => "JSON",
            Format::Columnar => "Parquet",
        }
    }
}

/// Extensions the loader accepts, for help texts and file dialogs.
pub fn supported_extensions() -> impl Iterator<Item = &'static str> {
    FORMATS.iter().map(|(e, _)| *e)
}
