//! Integration tests for datascope

use datascope::{
    AnalysisKind, AnalysisOptions, ChunkManifest, ChunkSplitter, Column, DatasetStats,
    ErrorKind, Loader, ProgressChannel, SearchOptions, Session, Table, Value, analyze,
    analyze_named, convert, search,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;

const PEOPLE: &str = "\
name,age,city,note
Alice,30,New York,N/A
Bob,,Los Angeles,ok
Carol,41,\"Portland, OR\",TBD
Dan,,Chicago,ok
";

fn write_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn people(dir: &Path) -> PathBuf {
    write_file(dir, "people.csv", PEOPLE.as_bytes())
}

#[test]
fn test_load_delimited_family() {
    let dir = tempfile::tempdir().unwrap();
    let cases: [(&str, &[u8]); 3] = [
        ("a.csv", b"x,y\n1,2\n3,4\n"),
        ("b.tsv", b"x\ty\n1\t2\n3\t4\n"),
        ("c.txt", b"x   y\n1 2\n3     4\n"),
    ];
    for (name, content) in cases {
        let path = write_file(dir.path(), name, content);
        let table = Loader::new().load(&path, None).unwrap();
        assert_eq!(table.num_rows(), 2, "{name}");
        assert_eq!(table.column_names(), vec!["x", "y"], "{name}");
    }
}

#[test]
fn test_load_counts_match_source() {
    let dir = tempfile::tempdir().unwrap();
    let table = Loader::new().load(people(dir.path()), None).unwrap();
    assert_eq!(table.num_rows(), 4);
    assert_eq!(table.column_names(), vec!["name", "age", "city", "note"]);
    assert_eq!(
        table.column("city").unwrap().values()[2],
        Value::from("Portland, OR")
    );
}

#[test]
fn test_load_failures() {
    let dir = tempfile::tempdir().unwrap();
    let unsupported = write_file(dir.path(), "notes.docx", b"whatever");
    assert_eq!(
        Loader::new().load(&unsupported, None).unwrap_err().kind(),
        ErrorKind::Format
    );

    let missing = dir.path().join("missing.csv");
    assert_eq!(Loader::new().load(&missing, None).unwrap_err().kind(), ErrorKind::Io);

    let broken_json = write_file(dir.path(), "broken.json", b"{\"a\": [1, 2");
    assert!(Loader::new().load(&broken_json, None).is_err());

    let bad_bytes = write_file(dir.path(), "bad.csv", b"a\n\xff\xfe\n");
    assert_eq!(
        Loader::new().load(&bad_bytes, None).unwrap_err().kind(),
        ErrorKind::Decode
    );
}

#[test]
fn test_load_with_explicit_encoding() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "latin.csv", b"city\nM\xfcnchen\n");
    let mut loader = Loader::new();
    loader.encoding("iso-8859-1").unwrap();
    let table = loader.load(&path, None).unwrap();
    assert_eq!(table.column("city").unwrap().values()[0], Value::from("München"));
}

#[test]
fn test_progress_over_channel_from_worker_thread() {
    let dir = tempfile::tempdir().unwrap();
    let path = people(dir.path());
    let (tx, rx) = mpsc::channel();

    let worker = thread::spawn(move || {
        let mut channel = ProgressChannel(tx);
        let mut loader = Loader::new();
        loader.batch_rows(1);
        loader.load(&path, Some(&mut channel)).map(|t| t.num_rows())
    });
    assert_eq!(worker.join().unwrap().unwrap(), 4);

    let events: Vec<_> = rx.iter().collect();
    assert!(events.windows(2).all(|w| w[0].percent <= w[1].percent));
    assert_eq!(events.last().unwrap().percent, 100.0);
    assert!(events[..events.len() - 1].iter().all(|e| e.percent < 100.0));
}

#[test]
fn test_split_invariants() {
    let dir = tempfile::tempdir().unwrap();
    let mut content = String::from("id,payload\n");
    for i in 0..200 {
        content.push_str(&format!("{i},\"value {i}, padded\"\n"));
    }
    let input = write_file(dir.path(), "rows.csv", content.as_bytes());

    let budget = 300u64;
    let mut splitter = ChunkSplitter::new(dir.path().join("ws"));
    splitter.chunk_size_bytes(budget);
    let manifest = splitter.split("rows", &input, None, None);

    assert_eq!(manifest.total_rows, 200);
    assert!(manifest.total_chunks > 1);

    let mut rows = 0;
    for i in 0..manifest.total_chunks {
        let chunk = fs::read_to_string(manifest.output_dir.join(format!("rows_chunk_{i}.csv"))).unwrap();
        let (header, body) = chunk.split_once('\n').unwrap();
        assert_eq!(header, "id,payload");
        assert!(body.len() as u64 <= budget);
        rows += body.lines().count();
    }
    assert_eq!(rows, 200);
    assert!(!manifest
        .output_dir
        .join(format!("rows_chunk_{}.csv", manifest.total_chunks))
        .exists());
}

#[test]
fn test_split_empty_inputs() {
    let dir = tempfile::tempdir().unwrap();
    let splitter = ChunkSplitter::new(dir.path());
    for (name, content) in [("zero.csv", &b""[..]), ("header.csv", &b"a,b\n"[..])] {
        let input = write_file(dir.path(), name, content);
        let manifest = splitter.split("empty", &input, None, None);
        assert_eq!(manifest.total_rows, 0, "{name}");
        assert_eq!(manifest.total_chunks, 0, "{name}");
    }
}

#[test]
fn test_split_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = ChunkSplitter::new(dir.path()).split("m", dir.path().join("nope.csv"), None, None);
    assert_eq!(manifest, ChunkManifest::empty(PathBuf::new()));
}

#[test]
fn test_convert_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let input = people(dir.path());
    let original = Loader::new().load(&input, None).unwrap();

    for target in ["csv", "tsv", "json", "parquet", "xlsx"] {
        let out = convert(&input, dir.path().join("converted"), target, None).unwrap();
        assert_eq!(out, dir.path().join("converted").join(format!("people.{target}")));
        let back = Loader::new().load(&out, None).unwrap();
        assert_eq!(back.num_rows(), original.num_rows(), "{target}");
        assert_eq!(back.column_names(), original.column_names(), "{target}");
        assert_eq!(
            back.column("age").unwrap().null_count(),
            2,
            "{target} lost nulls"
        );
    }
}

#[test]
fn test_convert_unsupported_target() {
    let dir = tempfile::tempdir().unwrap();
    let err = convert(people(dir.path()), dir.path(), "yaml", None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn test_analyses_on_loaded_file() {
    let dir = tempfile::tempdir().unwrap();
    let table = Loader::new().load(people(dir.path()), None).unwrap();
    let options = AnalysisOptions::default();

    let missing = analyze(&table, AnalysisKind::MissingValues, &options);
    assert!(missing.contains("age"));
    assert!(missing.contains("50.00%"));
    assert!(!missing.contains("city"));

    let placeholders = analyze(&table, AnalysisKind::Placeholders, &options);
    assert!(placeholders.contains("│ note   │     2 │ 50.00% │"), "{placeholders}");

    let special = analyze(&table, AnalysisKind::SpecialCharacters, &options);
    assert!(special.contains("city"));
    assert!(special.contains("note"));

    assert_eq!(
        analyze(&table, AnalysisKind::Duplicates, &options),
        "No duplicates. Checked 4 rows."
    );
    assert_eq!(
        analyze_named(&table, "Clustering", &options),
        "[Notice] Clustering not recognized."
    );
}

#[test]
fn test_whitespace_only_cells_are_placeholders_not_missing() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "blank.csv", b"a,b\n   ,x\nok,y\n");
    let table = Loader::new().load(&path, None).unwrap();
    assert_eq!(table.column("a").unwrap().values()[0], Value::from("   "));

    let options = AnalysisOptions::default();
    assert_eq!(
        analyze(&table, AnalysisKind::MissingValues, &options),
        "No missing values detected."
    );
    let placeholders = analyze(&table, AnalysisKind::Placeholders, &options);
    assert!(placeholders.contains("│ a      │     1 │ 50.00% │"), "{placeholders}");
}

#[test]
fn test_duplicate_report() {
    let table = Table::new(vec![
        Column::new("a", vec![Value::Int(1), Value::Int(1), Value::Int(3)]),
        Column::new("b", vec![Value::Int(2), Value::Int(2), Value::Int(4)]),
    ])
    .unwrap();
    let report = analyze(&table, AnalysisKind::Duplicates, &AnalysisOptions::default());
    assert!(report.contains("│ Duplicate entries     │     2 │"), "{report}");
    assert!(report.contains("│ Unique duplicate rows │     1 │"), "{report}");
}

#[test]
fn test_search_contract() {
    let table = Table::new(vec![Column::new(
        "col",
        vec![Value::from("Foo"), Value::from("bar"), Value::from("foo")],
    )])
    .unwrap();
    let mut options = SearchOptions::new();
    options.column("col");
    assert_eq!(search(&table, "foo", &options), vec![0, 2]);
    options.case_sensitive(true);
    assert_eq!(search(&table, "foo", &options), vec![2]);
    assert!(search(&table, "", &SearchOptions::new()).is_empty());
}

#[test]
fn test_session_split_last_and_stats() {
    let dir = tempfile::tempdir().unwrap();
    let input = people(dir.path());
    let session = Session::new(dir.path().join("ws"));
    let table = session.load(&input, None).unwrap();
    assert_eq!(session.last_loaded().as_deref(), Some(input.as_path()));

    let stats = DatasetStats::collect(&table, &input).unwrap();
    assert_eq!(stats.summary()[0], "Loaded 4 rows.");
    assert_eq!(stats.summary()[1], "File size: 0.00 MB");

    let manifest = session.split_last("people", None, None);
    assert_eq!(manifest.total_rows, 4);
    assert_eq!(manifest.total_chunks, 1);
    assert_eq!(manifest.output_dir, dir.path().join("ws").join("people").join("chunks"));
}
