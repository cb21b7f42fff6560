//! datascope CLI - profile, split, convert and inspect datasets

use clap::{Args, Parser, Subcommand};
use datascope::{
    AnalysisOptions, ChunkSplitter, Converter, DatasetStats, Delimiter, Loader, SearchOptions,
    Session, Table, analyze_named, parse_row_limit, search,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Load, split, convert and inspect tabular datasets.
///
/// Reads csv, tsv, txt, xls, xlsx, json, parquet and pq files.
#[derive(Parser, Debug)]
#[command(name = "datascope")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Hide progress updates
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a file and print its size, column types and first rows
    Profile {
        file: PathBuf,
        #[command(flatten)]
        read: ReadArgs,
    },
    /// Split a file into size-bounded CSV chunks
    Split {
        file: PathBuf,
        /// Dataset name, used as the workspace directory
        #[arg(short, long)]
        name: String,
        /// Workspace root
        #[arg(short, long, default_value = "datasets")]
        workspace: PathBuf,
        /// Chunk size in MiB
        #[arg(short, long, default_value = "256")]
        chunk_mb: u64,
        #[command(flatten)]
        read: ReadArgs,
    },
    /// Convert a file to csv, tsv, json, parquet or xlsx
    Convert {
        file: PathBuf,
        /// Target format
        #[arg(short, long)]
        to: String,
        /// Output directory
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
        #[command(flatten)]
        read: ReadArgs,
    },
    /// Run a diagnostic report
    Analyze {
        file: PathBuf,
        /// "Data Preview", "Missing Values", "Duplicate Detection",
        /// "Placeholder Detection", "Special Character Analysis"
        /// (or preview, missing, duplicates, placeholders, special)
        #[arg(short, long, default_value = "Data Preview")]
        kind: String,
        /// Restrict to one column
        #[arg(short, long)]
        column: Option<String>,
        /// Rows shown in previews and samples
        #[arg(short, long, default_value = "10")]
        rows: String,
        /// Reverse row order before sampling
        #[arg(long)]
        reverse: bool,
        #[command(flatten)]
        read: ReadArgs,
    },
    /// Print rows whose cells contain a term
    Search {
        file: PathBuf,
        term: String,
        /// Only search this column
        #[arg(short, long)]
        column: Option<String>,
        #[arg(long)]
        case_sensitive: bool,
        /// Match whole cells only
        #[arg(long)]
        whole_word: bool,
        #[command(flatten)]
        read: ReadArgs,
    },
}

#[derive(Args, Debug)]
struct ReadArgs {
    /// Text encoding label, or "auto" to detect
    #[arg(short, long, default_value = "utf-8")]
    encoding: String,
    /// Field delimiter (single character, "tab" or "whitespace")
    #[arg(short, long)]
    delimiter: Option<String>,
}

impl ReadArgs {
    fn loader(&self) -> datascope::Result<Loader> {
        let mut loader = Loader::new();
        loader.encoding(&self.encoding)?;
        if let Some(d) = &self.delimiter {
            loader.delimiter(Delimiter::parse(d)?);
        }
        Ok(loader)
    }
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> datascope::Result<ExitCode> {
    let mut report = |pct: f64, msg: &str| eprintln!("[{pct:>5.1}%] {msg}");
    let mut silent = |_: f64, _: &str| {};
    let progress: &mut dyn datascope::Progress = if cli.quiet { &mut silent } else { &mut report };

    match &cli.command {
        Command::Profile { file, read } => {
            let table = read.loader()?.load(file, Some(progress))?;
            let stats = DatasetStats::collect(&table, file)?;
            for line in stats.summary() {
                println!("{line}");
            }
            println!("Columns: {}", stats.column_count);
            println!();
            println!("{}", analyze_named(&table, "Data Preview", &AnalysisOptions::default()));
        }
        Command::Split {
            file,
            name,
            workspace,
            chunk_mb,
            read,
        } => {
            let mut splitter = ChunkSplitter::new(workspace);
            splitter.chunk_size_bytes(chunk_mb.saturating_mul(1024 * 1024));
            let mut log = |msg: &str| println!("{msg}");
            let is_csv = file
                .extension()
                .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
            let manifest = if is_csv && read.delimiter.is_none() {
                splitter.split(name, file, Some(&mut log), Some(progress))
            } else {
                let session = Session::with_parts(read.loader()?, splitter);
                session.load(file, None)?;
                session.split_last(name, Some(&mut log), Some(progress))
            };
            if manifest.output_dir.as_os_str().is_empty() {
                return Ok(ExitCode::FAILURE);
            }
            println!(
                "Chunked {} rows into {} files in {}",
                manifest.total_rows,
                manifest.total_chunks,
                manifest.output_dir.display()
            );
        }
        Command::Convert { file, to, out, read } => {
            let written = Converter::with_loader(read.loader()?).convert(file, out, to, Some(progress))?;
            println!("{}", written.display());
        }
        Command::Analyze {
            file,
            kind,
            column,
            rows,
            reverse,
            read,
        } => {
            let row_limit = parse_row_limit(rows)?;
            let table = read.loader()?.load(file, Some(progress))?;
            let mut options = AnalysisOptions::new();
            options.row_limit(row_limit).reverse(*reverse);
            if let Some(c) = column {
                options.column(c);
            }
            println!("{}", analyze_named(&table, kind, &options));
        }
        Command::Search {
            file,
            term,
            column,
            case_sensitive,
            whole_word,
            read,
        } => {
            let table = read.loader()?.load(file, Some(progress))?;
            let mut options = SearchOptions::new();
            options.case_sensitive(*case_sensitive).whole_word(*whole_word);
            if let Some(c) = column {
                options.column(c);
            }
            let hits = search(&table, term, &options);
            print_rows(&table, &hits);
            eprintln!("{} matching rows", hits.len());
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn print_rows(table: &Table, rows: &[usize]) {
    println!("row\t{}", table.column_names().join("\t"));
    for &idx in rows {
        if let Some(cells) = table.row(idx) {
            let cells: Vec<String> = cells.iter().map(|v| v.to_string()).collect();
            println!("{idx}\t{}", cells.join("\t"));
        }
    }
}
