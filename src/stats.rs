//! Summary figures for a loaded dataset.

use std::fs;
use std::path::Path;

use crate::error::{IoResultExt as _, Result};
use crate::table::Table;

const MIB: f64 = 1024.0 * 1024.0;

/// Size of a dataset and its source file.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetStats {
    pub row_count: usize,
    pub column_count: usize,
    /// Source file size in MiB.
    pub file_size_mb: f64,
}

impl DatasetStats {
    /// Gather figures for `table`, loaded from `path`.
    pub fn collect(table: &Table, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::metadata(path).at_path(path)?.len();
        Ok(Self {
            row_count: table.num_rows(),
            column_count: table.num_columns(),
            file_size_mb: bytes as f64 / MIB,
        })
    }

    /// Human-readable summary lines.
    pub fn summary(&self) -> [String; 2] {
        [
            format!("Loaded {} rows.", self.row_count),
            format!("File size: {:.2} MB", self.file_size_mb),
        ]
    }
}
