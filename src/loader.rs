//! Format-dispatching dataset loader.

use std::fs;
use std::path::Path;

use tracing::{error, info};

use crate::encoding::TextEncoding;
use crate::error::{IoResultExt as _, Result};
use crate::formats::delimited::{self, DEFAULT_BATCH_ROWS};
use crate::formats::{Delimiter, Format, columnar, json, spreadsheet};
use crate::progress::{Progress, Tracker};
use crate::table::Table;

/// Loads dataset files into a [`Table`].
///
/// # Example
///
/// ```no_run
/// use datascope::{Delimiter, Loader};
///
/// let mut loader = Loader::new();
/// loader.delimiter(Delimiter::Byte(b';')).encoding("latin1").unwrap();
///
/// let mut report = |pct: f64, msg: &str| eprintln!("{pct:>5.1}% {msg}");
/// let table = loader.load("data.csv", Some(&mut report)).unwrap();
/// println!("{} rows", table.num_rows());
/// ```
#[derive(Debug, Clone)]
pub struct Loader {
    encoding: TextEncoding,
    delimiter: Option<Delimiter>,
    batch_rows: usize,
}

impl Default for Loader {
    fn default() -> Self {
        Self {
            encoding: TextEncoding::default(),
            delimiter: None,
            batch_rows: DEFAULT_BATCH_ROWS,
        }
    }
}

impl Loader {
    /// Create a loader reading UTF-8 with extension-based delimiters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the text encoding by label (`"utf-8"`, `"latin1"`, `"auto"`, ...).
    pub fn encoding(&mut self, label: &str) -> Result<&mut Self> {
        self.encoding = TextEncoding::from_label(label)?;
        Ok(self)
    }

    /// Override the delimiter implied by the file extension.
    pub fn delimiter(&mut self, delimiter: Delimiter) -> &mut Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Rows parsed between two progress updates for delimited text.
    pub fn batch_rows(&mut self, rows: usize) -> &mut Self {
        self.batch_rows = rows.max(1);
        self
    }

    /// Load a dataset, reporting progress to `progress`.
    ///
    /// Failures are logged with the path before being returned.
    pub fn load<P: AsRef<Path>>(
        &self,
        path: P,
        progress: Option<&mut dyn Progress>,
    ) -> Result<Table> {
        let path = path.as_ref();
        let mut tracker = Tracker::new(progress);
        match self.load_tracked(path, &mut tracker) {
            Ok(table) => {
                info!(
                    "Loaded {}: {} rows, {} columns",
                    path.display(),
                    table.num_rows(),
                    table.num_columns()
                );
                Ok(table)
            }
            Err(e) => {
                error!("Error loading {}: {e}", path.display());
                Err(e)
            }
        }
    }

    pub(crate) fn load_tracked(&self, path: &Path, tracker: &mut Tracker<'_>) -> Result<Table> {
        let format = Format::from_path(path)?;
        fs::metadata(path).at_path(path)?;
        tracker.emit(0.0, "Starting load");

        let table = match format {
            Format::DelimitedText(default) => delimited::read(
                path,
                self.delimiter.unwrap_or(default),
                self.encoding,
                self.batch_rows,
                tracker,
            )?,
            other => {
                tracker.emit(10.0, &format!("Reading {} file", other.label()));
                match other {
                    Format::Spreadsheet => spreadsheet::read(path)?,
                    Format::Json => json::read(path)?,
                    _ => columnar::read(path)?,
                }
            }
        };

        tracker.emit(100.0, "Load complete");
        Ok(table)
    }
}
