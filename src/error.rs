use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Error type for loading, converting and splitting datasets.
#[derive(Error, Debug)]
pub enum DatascopeError {
    /// Unsupported or unrecognized file extension or conversion target.
    #[error("Unsupported format: {0}")]
    Format(String),

    /// Bytes could not be decoded under the requested encoding.
    #[error("Could not decode {location} as {encoding}")]
    Decode {
        /// Encoding label that was in effect.
        encoding: String,
        /// Human-readable position of the failure (row, byte offset).
        location: String,
    },

    /// Filesystem fault, tagged with the path being accessed.
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Malformed caller input (bad row limit, ragged table, ...).
    #[error("Invalid input: {0}")]
    Validation(String),

    /// CSV parsing or writing error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON parsing or writing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Parquet reading or writing error.
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Arrow array conversion error.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Spreadsheet reading or writing error.
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    /// Content that parsed but does not form a table.
    #[error("Malformed data: {0}")]
    Malformed(String),
}

/// Coarse error category, independent of the backend that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Format,
    Decode,
    Io,
    Validation,
    Malformed,
}

impl DatascopeError {
    /// Wrap an `io::Error` with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        DatascopeError::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DatascopeError::Format(_) => ErrorKind::Format,
            DatascopeError::Decode { .. } => ErrorKind::Decode,
            DatascopeError::Io { .. } => ErrorKind::Io,
            DatascopeError::Validation(_) => ErrorKind::Validation,
            DatascopeError::Csv(e) => match e.kind() {
                csv::ErrorKind::Io(_) => ErrorKind::Io,
                csv::ErrorKind::Utf8 { .. } => ErrorKind::Decode,
                _ => ErrorKind::Malformed,
            },
            DatascopeError::Json(e) if e.is_io() => ErrorKind::Io,
            DatascopeError::Json(_)
            | DatascopeError::Parquet(_)
            | DatascopeError::Arrow(_)
            | DatascopeError::Spreadsheet(_)
            | DatascopeError::Malformed(_) => ErrorKind::Malformed,
        }
    }
}

impl From<calamine::Error> for DatascopeError {
    fn from(err: calamine::Error) -> Self {
        DatascopeError::Spreadsheet(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for DatascopeError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        DatascopeError::Spreadsheet(err.to_string())
    }
}

/// Result type alias for datascope operations.
pub type Result<T> = std::result::Result<T, DatascopeError>;

/// Attach a path to `io::Result` values.
pub(crate) trait IoResultExt<T> {
    fn at_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn at_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| DatascopeError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(DatascopeError::Format("xyz".into()).kind(), ErrorKind::Format);
        assert_eq!(
            DatascopeError::Validation("rows".into()).kind(),
            ErrorKind::Validation
        );
        let err = DatascopeError::io("missing.csv", io::Error::from(io::ErrorKind::NotFound));
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.to_string().contains("missing.csv"));
    }
}
