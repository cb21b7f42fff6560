//! Streaming reader and writer for comma, tab, custom and whitespace delimited text.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, Cursor, Read};
use std::path::Path;

use csv::ByteRecord;
use tracing::debug;

use super::Delimiter;
use crate::encoding::{TextEncoding, decode_utf8_field, skip_bom};
use crate::error::{DatascopeError, IoResultExt as _, Result};
use crate::field_type::infer_column_type;
use crate::patterns::WHITESPACE_RUN_PATTERN;
use crate::progress::Tracker;
use crate::table::{Column, Table, Value, unique_names};

/// Rows parsed between two progress updates.
pub const DEFAULT_BATCH_ROWS: usize = 10_000;

const SCAN_BUFFER: usize = 64 * 1024;

/// Count lines the way a line iterator would: a final line without a
/// trailing newline still counts.
pub fn count_lines<R: Read>(mut reader: R) -> std::io::Result<u64> {
    let mut buf = vec![0u8; SCAN_BUFFER];
    let mut lines = 0u64;
    let mut last = None;
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        lines += bytecount::count(&buf[..n], b'\n') as u64;
        last = Some(buf[n - 1]);
    }
    if matches!(last, Some(b) if b != b'\n') {
        lines += 1;
    }
    Ok(lines)
}

/// A source of raw text records.
trait RecordSource {
    /// Append up to `max` records to `out`, returning how many were read.
    fn read_batch(&mut self, max: usize, out: &mut Vec<Vec<String>>) -> Result<usize>;
}

/// Records split by a single-byte delimiter, with CSV quoting rules.
struct CsvRecords<R: Read> {
    reader: csv::Reader<R>,
    record: ByteRecord,
    row: usize,
}

impl<R: Read> CsvRecords<R> {
    fn new(source: R, delimiter: u8) -> Self {
        let reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(source);
        Self {
            reader,
            record: ByteRecord::new(),
            row: 0,
        }
    }
}

impl<R: Read> RecordSource for CsvRecords<R> {
    fn read_batch(&mut self, max: usize, out: &mut Vec<Vec<String>>) -> Result<usize> {
        let mut read = 0;
        while read < max && self.reader.read_byte_record(&mut self.record)? {
            let mut fields = Vec::with_capacity(self.record.len());
            for (i, field) in self.record.iter().enumerate() {
                let field = if self.row == 0 && i == 0 { skip_bom(field) } else { field };
                fields.push(decode_utf8_field(field, self.row)?.to_string());
            }
            out.push(fields);
            self.row += 1;
            read += 1;
        }
        Ok(read)
    }
}

/// Records split on runs of whitespace; blank lines are skipped.
struct WhitespaceRecords<'p, R: BufRead> {
    path: &'p Path,
    reader: R,
    line: Vec<u8>,
    row: usize,
}

impl<R: BufRead> RecordSource for WhitespaceRecords<'_, R> {
    fn read_batch(&mut self, max: usize, out: &mut Vec<Vec<String>>) -> Result<usize> {
        let mut read = 0;
        while read < max {
            self.line.clear();
            let n = self
                .reader
                .read_until(b'\n', &mut self.line)
                .at_path(self.path)?;
            if n == 0 {
                break;
            }
            let raw = if self.row == 0 { skip_bom(&self.line) } else { &self.line[..] };
            let text = decode_utf8_field(raw, self.row)?.trim();
            self.row += 1;
            if text.is_empty() {
                continue;
            }
            out.push(WHITESPACE_RUN_PATTERN.split(text).map(str::to_string).collect());
            read += 1;
        }
        Ok(read)
    }
}

/// Load a delimited file in batches, reporting progress after each batch.
pub(crate) fn read(
    path: &Path,
    delimiter: Delimiter,
    encoding: TextEncoding,
    batch_rows: usize,
    tracker: &mut Tracker<'_>,
) -> Result<Table> {
    // UTF-8 streams straight from disk; other encodings are transcoded up front.
    let (source, total_lines): (Box<dyn BufRead>, u64) = if encoding.is_utf8() {
        let total = count_lines(File::open(path).at_path(path)?).at_path(path)?;
        let file = File::open(path).at_path(path)?;
        (Box::new(BufReader::new(file)), total)
    } else {
        let bytes = fs::read(path).at_path(path)?;
        let text = encoding.decode(&bytes)?.into_owned().into_bytes();
        let total = count_lines(text.as_slice()).at_path(path)?;
        (Box::new(Cursor::new(text)), total)
    };
    debug!(
        "{}: {total_lines} lines to load as {}",
        path.display(),
        encoding.name()
    );

    let mut records: Box<dyn RecordSource + '_> = match delimiter {
        Delimiter::Byte(b) => Box::new(CsvRecords::new(source, b)),
        Delimiter::Whitespace => Box::new(WhitespaceRecords {
            path,
            reader: source,
            line: Vec::new(),
            row: 0,
        }),
    };

    let mut header = Vec::with_capacity(1);
    if records.read_batch(1, &mut header)? == 0 {
        return Err(DatascopeError::Malformed(format!(
            "{} is empty or missing a header",
            path.display()
        )));
    }
    let header = header.pop().unwrap_or_default();
    let width = header.len();

    let mut raw: Vec<Vec<String>> = vec![Vec::new(); width];
    let mut batch = Vec::with_capacity(batch_rows);
    let mut rows_read = 0usize;
    loop {
        batch.clear();
        let n = records.read_batch(batch_rows.max(1), &mut batch)?;
        if n == 0 {
            break;
        }
        for (offset, row) in batch.drain(..).enumerate() {
            if row.len() > width {
                return Err(DatascopeError::Malformed(format!(
                    "expected {width} fields in data row {}, saw {}",
                    rows_read + offset,
                    row.len()
                )));
            }
            let mut cells = row.into_iter();
            for column in &mut raw {
                column.push(cells.next().unwrap_or_default());
            }
        }
        rows_read += n;
        tracker.emit_partial(rows_read as f64, total_lines as f64, "Loading data");
        debug!("Loaded {rows_read}/{total_lines} rows");
    }

    let columns = unique_names(header)
        .into_iter()
        .zip(raw)
        .map(|(name, cells)| {
            let dtype = infer_column_type(cells.iter().map(String::as_str));
            let values = cells.iter().map(|c| Value::parse_as(c, dtype)).collect();
            Column::new(name, values)
        })
        .collect();
    Table::new(columns)
}

/// Write a table as delimited text with a header row.
pub(crate) fn write(table: &Table, path: &Path, delimiter: u8) -> Result<()> {
    let file = File::create(path).at_path(path)?;
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(file);

    writer.write_record(table.column_names())?;
    let mut row = Vec::with_capacity(table.num_columns());
    for idx in 0..table.num_rows() {
        row.clear();
        row.extend(table.columns().iter().map(|c| c.values()[idx].to_string()));
        writer.write_record(&row)?;
    }
    writer.flush().at_path(path)?;
    Ok(())
}
