//! Re-serialise a dataset in another format.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::error::{DatascopeError, IoResultExt as _, Result};
use crate::formats::{Delimiter, Format, columnar, delimited, json, spreadsheet};
use crate::loader::Loader;
use crate::progress::{Progress, Tracker};
use crate::table::Table;

/// Load `input` and write it as `target` (`"csv"`, `"parquet"`, ...) into
/// `output_dir`, which is created if needed.
///
/// Returns the path of the written file, `{input stem}.{target extension}`.
pub fn convert<P, Q>(
    input: P,
    output_dir: Q,
    target: &str,
    progress: Option<&mut dyn Progress>,
) -> Result<PathBuf>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    Converter::default().convert(input, output_dir, target, progress)
}

/// Conversion with a configured [`Loader`].
#[derive(Debug, Clone, Default)]
pub struct Converter {
    loader: Loader,
}

impl Converter {
    /// Convert using `loader` to read the input.
    pub fn with_loader(loader: Loader) -> Self {
        Self { loader }
    }

    /// See [`convert`].
    pub fn convert<P, Q>(
        &self,
        input: P,
        output_dir: Q,
        target: &str,
        progress: Option<&mut dyn Progress>,
    ) -> Result<PathBuf>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let input = input.as_ref();
        let mut tracker = Tracker::new(progress);
        match self.convert_tracked(input, output_dir.as_ref(), target, &mut tracker) {
            Ok(out) => {
                info!("Converted {} to {}", input.display(), out.display());
                Ok(out)
            }
            Err(e) => {
                error!("Error converting {} to {target}: {e}", input.display());
                Err(e)
            }
        }
    }

    fn convert_tracked(
        &self,
        input: &Path,
        output_dir: &Path,
        target: &str,
        tracker: &mut Tracker<'_>,
    ) -> Result<PathBuf> {
        let (format, ext) = Format::target(target)?;
        let stem = input
            .file_stem()
            .ok_or_else(|| DatascopeError::Validation(format!("{} has no file name", input.display())))?;

        tracker.set_range(0.0, 90.0);
        let table = self.loader.load_tracked(input, tracker)?;

        tracker.set_range(90.0, 100.0);
        tracker.emit(0.0, "Writing output");
        fs::create_dir_all(output_dir).at_path(output_dir)?;
        let mut file_name = stem.to_os_string();
        file_name.push(".");
        file_name.push(ext);
        let output = output_dir.join(file_name);
        write_table(&table, &output, format)?;

        tracker.emit(100.0, "Conversion complete");
        Ok(output)
    }
}

/// Write a table in the given format.
pub fn write_table(table: &Table, path: &Path, format: Format) -> Result<()> {
    match format {
        Format::DelimitedText(Delimiter::Byte(b)) => delimited::write(table, path, b),
        Format::DelimitedText(Delimiter::Whitespace) => Err(DatascopeError::Format(
            "whitespace-delimited text cannot be written".to_string(),
        )),
        Format::Json => json::write(table, path),
        Format::Columnar => columnar::write(table, path),
        Format::Spreadsheet => spreadsheet::write(table, path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::io::Write;

    fn csv_input(dir: &Path) -> PathBuf {
        let path = dir.join("people.csv");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(b"name,age,score\nAnn,31,1.5\nBob,,2.0\nCy,40,\n").unwrap();
        path
    }

    #[test]
    fn test_convert_to_each_target() {
        let dir = tempfile::tempdir().unwrap();
        let input = csv_input(dir.path());
        let original = Loader::new().load(&input, None).unwrap();

        for target in ["csv", "tsv", "json", "parquet", "xlsx"] {
            let out = convert(&input, dir.path().join("out"), target, None).unwrap();
            assert_eq!(out.file_name().unwrap().to_str().unwrap(), format!("people.{target}"));
            let back = Loader::new().load(&out, None).unwrap();
            assert_eq!(back.num_rows(), original.num_rows(), "{target}");
            assert_eq!(back.column_names(), original.column_names(), "{target}");
        }
    }

    #[test]
    fn test_dotted_stem_keeps_every_segment() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("out");
        for version in ["v1", "v2"] {
            let input = dir.path().join(format!("sales.{version}.csv"));
            fs::write(&input, format!("region\n{version}\n")).unwrap();
            let out = convert(&input, &out_dir, "json", None).unwrap();
            assert_eq!(out, out_dir.join(format!("sales.{version}.json")));
        }
        assert_eq!(fs::read_dir(&out_dir).unwrap().count(), 2);
    }

    #[test]
    fn test_progress_ends_at_100() {
        let dir = tempfile::tempdir().unwrap();
        let input = csv_input(dir.path());
        let mut events: Vec<(f64, String)> = Vec::new();
        let mut sink = |p: f64, m: &str| events.push((p, m.to_string()));
        convert(&input, dir.path(), "json", Some(&mut sink)).unwrap();

        assert!(events.windows(2).all(|w| w[0].0 <= w[1].0));
        assert!(events.iter().any(|(p, m)| *p == 90.0 && m == "Writing output"));
        assert_eq!(events.last().unwrap(), &(100.0, "Conversion complete".to_string()));
    }

    #[test]
    fn test_unsupported_target() {
        let dir = tempfile::tempdir().unwrap();
        let input = csv_input(dir.path());
        let err = convert(&input, dir.path(), "docx", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
        let err = convert(&input, dir.path(), "txt", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn test_output_dir_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = csv_input(dir.path());
        let err = convert(&input, &input, "csv", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
