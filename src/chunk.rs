//! Split a large CSV file into size-bounded chunk files.
//!
//! Rows are streamed as raw records and never assembled into a [`Table`].
//! Every chunk starts with the source header line, copied byte for byte.
//!
//! [`Table`]: crate::Table

use std::fs::{self, File};
use std::io::{Read as _, Write as _};
use std::path::{Path, PathBuf};

use csv::{ByteRecord, Terminator, Writer, WriterBuilder};
use tracing::{error, info, warn};

use crate::encoding::skip_bom;
use crate::error::{DatascopeError, IoResultExt as _, Result};
use crate::progress::{Progress, Tracker};
use crate::workspace::DatasetWorkspace;

/// Default chunk body budget: 256 MiB.
pub const DEFAULT_CHUNK_SIZE: u64 = 256 * 1024 * 1024;

/// Outcome of a split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkManifest {
    /// Data rows written across all chunks (header excluded).
    pub total_rows: u64,
    /// Chunk files fully written.
    pub total_chunks: usize,
    /// Directory holding the chunk files; empty when the split failed.
    pub output_dir: PathBuf,
}

impl ChunkManifest {
    /// The manifest returned when nothing could be split.
    pub fn empty(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            total_rows: 0,
            total_chunks: 0,
            output_dir: output_dir.into(),
        }
    }
}

/// Splits CSV files into the `chunks/` directory of a dataset workspace.
///
/// # Example
///
/// ```no_run
/// use datascope::ChunkSplitter;
///
/// let mut splitter = ChunkSplitter::new("workspace");
/// splitter.chunk_size_bytes(64 * 1024 * 1024);
///
/// let mut log = |msg: &str| println!("{msg}");
/// let manifest = splitter.split("sales", "sales.csv", Some(&mut log), None);
/// println!("{} rows in {} chunks", manifest.total_rows, manifest.total_chunks);
/// ```
#[derive(Debug, Clone)]
pub struct ChunkSplitter {
    root: PathBuf,
    chunk_size_bytes: u64,
}

impl ChunkSplitter {
    /// Create a splitter writing under the workspace `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            chunk_size_bytes: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Set the body budget of each chunk in bytes.
    pub fn chunk_size_bytes(&mut self, bytes: u64) -> &mut Self {
        self.chunk_size_bytes = bytes;
        self
    }

    /// Workspace root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Split `input` into `{stem}_chunk_{i}.csv` files.
    ///
    /// Never fails: errors are logged and reported through `log`, and an
    /// empty manifest is returned. Chunks written before a failure are
    /// removed so the directory agrees with the manifest.
    pub fn split<P: AsRef<Path>>(
        &self,
        dataset_name: &str,
        input: P,
        log: Option<&mut dyn FnMut(&str)>,
        progress: Option<&mut dyn Progress>,
    ) -> ChunkManifest {
        let input = input.as_ref();
        let mut status = StatusLog { sink: log };
        let mut tracker = Tracker::new(progress);
        let mut written = Vec::new();

        match self.try_split(dataset_name, input, &mut status, &mut tracker, &mut written) {
            Ok(manifest) => manifest,
            Err(e) => {
                error!("Error splitting {}: {e}", input.display());
                status.say(&format!("Error: {e}"));
                for path in &written {
                    if let Err(cleanup) = fs::remove_file(path) {
                        warn!("Could not remove partial chunk {}: {cleanup}", path.display());
                    }
                }
                ChunkManifest::empty(PathBuf::new())
            }
        }
    }

    fn try_split(
        &self,
        dataset_name: &str,
        input: &Path,
        status: &mut StatusLog<'_>,
        tracker: &mut Tracker<'_>,
        written: &mut Vec<PathBuf>,
    ) -> Result<ChunkManifest> {
        if self.chunk_size_bytes == 0 {
            return Err(DatascopeError::Validation(
                "chunk size must be at least one byte".to_string(),
            ));
        }
        let workspace = DatasetWorkspace::create(&self.root, dataset_name)?;
        let output_dir = workspace.chunks;
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .ok_or_else(|| DatascopeError::Validation(format!("{} has no file name", input.display())))?;

        status.say(&format!("Reading from: {}", input.display()));
        status.say(&format!("Writing chunks to: {}", output_dir.display()));
        status.say(&format!("Chunk size: {} bytes", self.chunk_size_bytes));
        tracker.emit(0.0, "Starting chunking");

        let total_bytes = fs::metadata(input).at_path(input)?.len();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(File::open(input).at_path(input)?);

        let mut record = ByteRecord::new();
        if !reader.read_byte_record(&mut record)? {
            status.say("Error: File is empty or missing a header.");
            return Ok(ChunkManifest::empty(output_dir));
        }
        let header = raw_header(input, reader.position().byte())?;
        let terminator = if header.ends_with(b"\r\n") {
            Terminator::CRLF
        } else {
            Terminator::Any(b'\n')
        };

        let mut chunks = ChunkWriter {
            dir: &output_dir,
            stem: &stem,
            header: &header,
            index: 0,
        };
        let mut body = body_writer(Vec::new(), terminator);
        let mut body_len = 0usize;
        let mut rows_in_body = 0u64;
        let mut total_rows = 0u64;
        let budget = usize::try_from(self.chunk_size_bytes).unwrap_or(usize::MAX);

        while reader.read_byte_record(&mut record)? {
            body.write_byte_record(&record)?;
            body.flush().at_path(input)?;
            let len = body.get_ref().len();

            if rows_in_body > 0 && len > budget {
                // The new row opens the next chunk.
                let mut bytes = into_bytes(body, input)?;
                let tail = bytes.split_off(body_len);
                written.push(chunks.write(&bytes)?);
                status.say(&format!("Chunk {} written: {rows_in_body} rows", chunks.index - 1));
                body = body_writer(tail, terminator);
                rows_in_body = 0;
            }
            body_len = body.get_ref().len();
            rows_in_body += 1;
            total_rows += 1;
            tracker.emit_partial(reader.position().byte() as f64, total_bytes as f64, "Chunking");
        }

        if rows_in_body > 0 {
            let bytes = into_bytes(body, input)?;
            written.push(chunks.write(&bytes)?);
            status.say(&format!("Final chunk {} written: {rows_in_body} rows", chunks.index - 1));
        }

        let total_chunks = chunks.index;
        status.say(&format!("All chunks written. Total rows: {total_rows}"));
        tracker.emit(100.0, "Chunking complete");
        info!(
            "Split {} into {total_chunks} chunks ({total_rows} rows)",
            input.display()
        );
        Ok(ChunkManifest {
            total_rows,
            total_chunks,
            output_dir,
        })
    }
}

/// Writes numbered chunk files sharing one header.
struct ChunkWriter<'a> {
    dir: &'a Path,
    stem: &'a str,
    header: &'a [u8],
    index: usize,
}

impl ChunkWriter<'_> {
    fn write(&mut self, body: &[u8]) -> Result<PathBuf> {
        let path = self.dir.join(format!("{}_chunk_{}.csv", self.stem, self.index));
        let mut file = File::create(&path).at_path(&path)?;
        file.write_all(self.header).at_path(&path)?;
        file.write_all(body).at_path(&path)?;
        file.sync_all().at_path(&path)?;
        self.index += 1;
        Ok(path)
    }
}

/// Status messages for the caller's log callback, mirrored to `tracing`.
struct StatusLog<'a> {
    sink: Option<&'a mut dyn FnMut(&str)>,
}

impl StatusLog<'_> {
    fn say(&mut self, message: &str) {
        info!("{message}");
        if let Some(sink) = self.sink.as_deref_mut() {
            sink(message);
        }
    }
}

fn body_writer(buf: Vec<u8>, terminator: Terminator) -> Writer<Vec<u8>> {
    WriterBuilder::new()
        .flexible(true)
        .terminator(terminator)
        .from_writer(buf)
}

fn into_bytes(writer: Writer<Vec<u8>>, path: &Path) -> Result<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| DatascopeError::io(path, e.into_error()))
}

/// The first `len` bytes of the file, without a BOM and ending in a newline.
fn raw_header(path: &Path, len: u64) -> Result<Vec<u8>> {
    let mut header = Vec::with_capacity(len as usize + 1);
    File::open(path)
        .at_path(path)?
        .take(len)
        .read_to_end(&mut header)
        .at_path(path)?;
    let mut header = skip_bom(&header).to_vec();
    if !header.ends_with(b"\n") {
        header.push(b'\n');
    }
    Ok(header)
}
