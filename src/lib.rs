//! datascope: load, split, convert and inspect tabular datasets
//!
//! Reads delimited text (`.csv`, `.tsv`, whitespace-separated `.txt`), Excel
//! workbooks (`.xls`, `.xlsx`), JSON and Parquet (`.parquet`, `.pq`) into an
//! in-memory [`Table`], then runs diagnostics and searches over it. Large CSV
//! files can be split into size-bounded chunks without loading them.
//!
//! # Quick Start
//!
//! ```no_run
//! use datascope::{AnalysisKind, AnalysisOptions, Loader, SearchOptions, analyze, search};
//!
//! let mut progress = |pct: f64, msg: &str| eprintln!("{pct:>5.1}% {msg}");
//! let table = Loader::new().load("sales.csv", Some(&mut progress)).unwrap();
//!
//! let report = analyze(&table, AnalysisKind::MissingValues, &AnalysisOptions::default());
//! println!("{report}");
//!
//! let mut options = SearchOptions::new();
//! options.column("region");
//! let rows = search(&table, "north", &options);
//! println!("{} matching rows", rows.len());
//! ```
//!
//! # Splitting and converting
//!
//! ```no_run
//! use datascope::{ChunkSplitter, convert};
//!
//! let mut splitter = ChunkSplitter::new("workspace");
//! splitter.chunk_size_bytes(128 * 1024 * 1024);
//! let manifest = splitter.split("sales", "sales.csv", None, None);
//! println!("{} chunks in {}", manifest.total_chunks, manifest.output_dir.display());
//!
//! let out = convert("sales.csv", "exports", "parquet", None).unwrap();
//! println!("wrote {}", out.display());
//! ```
//!
//! # Progress
//!
//! Long operations take an optional [`Progress`] sink: any
//! `FnMut(f64, &str)` closure or a [`ProgressChannel`]. Percentages never go
//! down within one operation and a successful operation ends at 100.

pub mod analysis;
mod chunk;
mod convert;
mod encoding;
mod error;
mod field_type;
pub mod formats;
mod grid;
mod loader;
mod patterns;
mod progress;
mod search;
mod session;
mod stats;
mod table;
mod workspace;

pub use analysis::{AnalysisKind, AnalysisOptions, analyze, analyze_named, parse_row_limit};
pub use chunk::{ChunkManifest, ChunkSplitter, DEFAULT_CHUNK_SIZE};
pub use convert::{Converter, convert, write_table};
pub use error::{DatascopeError, ErrorKind, Result};
pub use field_type::Type;
pub use formats::{Delimiter, Format, supported_extensions};
pub use loader::Loader;
pub use progress::{Progress, ProgressChannel, ProgressEvent};
pub use search::{SearchOptions, search};
pub use session::Session;
pub use stats::DatasetStats;
pub use table::{Column, Table, Value};
pub use workspace::DatasetWorkspace;

// Lower-level helpers
pub use encoding::{TextEncoding, is_utf8};
pub use field_type::{detect_cell_type, infer_column_type};
pub use patterns::{PLACEHOLDERS, is_placeholder};
