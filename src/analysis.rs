//! Diagnostic reports over a loaded table.
//!
//! Every analysis works on a view of the table: optionally a single column,
//! optionally in reverse row order. Reports are plain text with box-drawn
//! tables, ready to show to a user.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use foldhash::{HashMap, HashMapExt};
use tracing::warn;

use crate::error::{DatascopeError, Result};
use crate::grid::Grid;
use crate::patterns::{SPECIAL_CHAR_PATTERN, is_placeholder};
use crate::table::{Column, Table, Value};

/// Default number of rows shown by row-limited reports.
pub const DEFAULT_ROW_LIMIT: usize = 10;

/// The available diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalysisKind {
    /// Column types and the first rows.
    Preview,
    /// Null count and share per column.
    MissingValues,
    /// Rows that exactly repeat another row.
    Duplicates,
    /// Cells holding stand-in tokens such as `N/A` or `TBD`.
    Placeholders,
    /// Cells containing characters other than word characters and whitespace.
    SpecialCharacters,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 5] = [
        AnalysisKind::Preview,
        AnalysisKind::MissingValues,
        AnalysisKind::Duplicates,
        AnalysisKind::Placeholders,
        AnalysisKind::SpecialCharacters,
    ];

    /// Display name, also accepted by [`FromStr`].
    pub fn name(&self) -> &'static str {
        match self {
            AnalysisKind::Preview => "Data Preview",
            AnalysisKind::MissingValues => "Missing Values",
            AnalysisKind::Duplicates => "Duplicate Detection",
            AnalysisKind::Placeholders => "Placeholder Detection",
            AnalysisKind::SpecialCharacters => "Special Character Analysis",
        }
    }

    fn alias(&self) -> &'static str {
        match self {
            AnalysisKind::Preview => "preview",
            AnalysisKind::MissingValues => "missing",
            AnalysisKind::Duplicates => "duplicates",
            AnalysisKind::Placeholders => "placeholders",
            AnalysisKind::SpecialCharacters => "special",
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AnalysisKind {
    type Err = DatascopeError;

    /// Accepts display names (`"Missing Values"`) and short aliases
    /// (`"missing"`), ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(s) || k.alias().eq_ignore_ascii_case(s))
            .ok_or_else(|| DatascopeError::Validation(format!("unknown analysis {s:?}")))
    }
}

/// Options shared by all analyses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisOptions {
    column: Option<String>,
    row_limit: usize,
    reverse: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            column: None,
            row_limit: DEFAULT_ROW_LIMIT,
            reverse: false,
        }
    }
}

impl AnalysisOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the analysis to one column. Unknown names fall back to the
    /// whole table.
    pub fn column(&mut self, name: impl Into<String>) -> &mut Self {
        self.column = Some(name.into());
        self
    }

    /// Maximum rows in previews and duplicate samples.
    pub fn row_limit(&mut self, rows: usize) -> &mut Self {
        self.row_limit = rows;
        self
    }

    /// Reverse row order before sampling.
    pub fn reverse(&mut self, yes: bool) -> &mut Self {
        self.reverse = yes;
        self
    }
}

/// Parse a user-entered row limit.
pub fn parse_row_limit(raw: &str) -> Result<usize> {
    raw.trim().parse().map_err(|_| {
        DatascopeError::Validation(format!("row limit must be a non-negative integer, got {raw:?}"))
    })
}

/// Run one analysis and return its report.
pub fn analyze(table: &Table, kind: AnalysisKind, options: &AnalysisOptions) -> String {
    let view = View::new(table, options);
    match kind {
        AnalysisKind::Preview => preview(&view, options.row_limit),
        AnalysisKind::MissingValues => missing_values(&view),
        AnalysisKind::Duplicates => duplicates(&view, options.row_limit),
        AnalysisKind::Placeholders => placeholders(&view),
        AnalysisKind::SpecialCharacters => special_characters(&view),
    }
}

/// Run an analysis by name; unknown names yield a notice instead of a report.
pub fn analyze_named(table: &Table, name: &str, options: &AnalysisOptions) -> String {
    match name.parse() {
        Ok(kind) => analyze(table, kind, options),
        Err(_) => format!("[Notice] {name} not recognized."),
    }
}

/// Selected columns and the row order to visit them in.
struct View<'a> {
    columns: Vec<&'a Column>,
    order: Vec<usize>,
}

impl<'a> View<'a> {
    fn new(table: &'a Table, options: &AnalysisOptions) -> Self {
        let columns = match options.column.as_deref() {
            Some(name) => match table.column(name) {
                Some(col) => vec![col],
                None => {
                    warn!("Column {name:?} not found, analysing all columns");
                    table.columns().iter().collect()
                }
            },
            None => table.columns().iter().collect(),
        };
        let mut order: Vec<usize> = (0..table.num_rows()).collect();
        if options.reverse {
            order.reverse();
        }
        Self { columns, order }
    }

    fn num_rows(&self) -> usize {
        self.order.len()
    }

    fn row(&self, idx: usize) -> Vec<&'a Value> {
        self.columns.iter().map(|c| &c.values()[idx]).collect()
    }

    /// Grid of the given rows, led by an unnamed row-index column.
    fn rows_grid(&self, rows: impl IntoIterator<Item = usize>) -> Grid {
        let mut grid = Grid::new(
            std::iter::once(String::new()).chain(self.columns.iter().map(|c| c.name().to_string())),
        );
        for idx in rows {
            grid.push_row(
                std::iter::once(idx.to_string())
                    .chain(self.columns.iter().map(|c| c.values()[idx].to_string())),
            );
        }
        grid
    }
}

fn percent(count: usize, total: usize) -> String {
    format!("{:.2}%", count as f64 / total as f64 * 100.0)
}

fn preview(view: &View<'_>, row_limit: usize) -> String {
    let mut types = Grid::new(["Column", "Dtype"]);
    for col in &view.columns {
        types.push_row([col.name().to_string(), col.dtype().to_string()]);
    }
    let sample = view.rows_grid(view.order.iter().copied().take(row_limit));
    format!("[Data Types]\n{}\n\n[Preview]\n{}", types.render(), sample.render())
}

fn missing_values(view: &View<'_>) -> String {
    let total = view.num_rows();
    let mut grid = Grid::new(["Column", "Count", "%"]);
    let mut found = false;
    for col in &view.columns {
        let count = col.null_count();
        if count > 0 {
            found = true;
            grid.push_row([col.name().to_string(), count.to_string(), percent(count, total)]);
        }
    }
    if !found {
        return "No missing values detected.".to_string();
    }
    format!("=== Missing Values ===\n{}\n\nTotal rows: {total}", grid.render())
}

fn duplicates(view: &View<'_>, row_limit: usize) -> String {
    let mut counts: HashMap<Vec<&Value>, usize> = HashMap::with_capacity(view.num_rows());
    for &idx in &view.order {
        *counts.entry(view.row(idx)).or_default() += 1;
    }

    let dup_rows: Vec<usize> = view
        .order
        .iter()
        .copied()
        .filter(|&idx| counts.get(&view.row(idx)).is_some_and(|&n| n > 1))
        .collect();
    if dup_rows.is_empty() {
        return format!("No duplicates. Checked {} rows.", view.num_rows());
    }
    // rows repeating an earlier row
    let repeats: usize = counts.values().filter(|&&n| n > 1).map(|n| n - 1).sum();

    let mut metrics = Grid::new(["Metric", "Value"]);
    metrics.push_row(["Total Rows".to_string(), view.num_rows().to_string()]);
    metrics.push_row(["Duplicate entries".to_string(), dup_rows.len().to_string()]);
    metrics.push_row(["Unique duplicate rows".to_string(), repeats.to_string()]);
    let sample = view.rows_grid(dup_rows.into_iter().take(row_limit));
    format!("Duplicate Report\n{}\n\n{}", metrics.render(), sample.render())
}

fn placeholders(view: &View<'_>) -> String {
    let total = view.num_rows();
    let mut grid = Grid::new(["Column", "Count", "%"]);
    let mut found = false;
    for col in &view.columns {
        let count = col
            .values()
            .iter()
            .filter(|v| !v.is_null() && is_placeholder(&v.to_string()))
            .count();
        if count > 0 {
            found = true;
            grid.push_row([col.name().to_string(), count.to_string(), percent(count, total)]);
        }
    }
    if !found {
        return "No placeholders found.".to_string();
    }
    grid.render()
}

fn special_characters(view: &View<'_>) -> String {
    let mut grid = Grid::new(["Column", "Count", "Chars"]);
    let mut found = false;
    for col in &view.columns {
        let mut count = 0usize;
        let mut chars = BTreeSet::new();
        for value in col.values().iter().filter(|v| !v.is_null()) {
            let text = value.to_string();
            let mut hit = false;
            for m in SPECIAL_CHAR_PATTERN.find_iter(&text) {
                hit = true;
                chars.extend(m.as_str().chars());
            }
            count += usize::from(hit);
        }
        if count > 0 {
            found = true;
            grid.push_row([col.name().to_string(), count.to_string(), chars.into_iter().collect()]);
        }
    }
    if !found {
        return "No special characters found.".to_string();
    }
    grid.render()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: Vec<(&str, Vec<Value>)>) -> Table {
        Table::new(
            columns
                .into_iter()
                .map(|(name, values)| Column::new(name, values))
                .collect(),
        )
        .unwrap()
    }

    fn strs(values: &[&str]) -> Vec<Value> {
        values.iter().map(|s| Value::from(*s)).collect()
    }

    #[test]
    fn test_kind_names() {
        for kind in AnalysisKind::ALL {
            assert_eq!(kind.name().parse::<AnalysisKind>().unwrap(), kind);
        }
        assert_eq!("missing".parse::<AnalysisKind>().unwrap(), AnalysisKind::MissingValues);
        assert!("Correlation".parse::<AnalysisKind>().is_err());
    }

    #[test]
    fn test_missing_values_report() {
        let t = table(vec![
            ("a", vec![Value::Int(1), Value::Null, Value::Int(3), Value::Null]),
            ("b", vec![Value::Int(1); 4]),
        ]);
        let report = analyze(&t, AnalysisKind::MissingValues, &AnalysisOptions::default());
        assert!(report.starts_with("=== Missing Values ===\n"));
        assert!(report.contains("│ a      │     2 │ 50.00% │"), "{report}");
        assert!(!report.contains("│ b "));
        assert!(report.ends_with("\n\nTotal rows: 4"));
    }

    #[test]
    fn test_no_missing_values() {
        let t = table(vec![("a", vec![Value::Int(1)])]);
        assert_eq!(
            analyze(&t, AnalysisKind::MissingValues, &AnalysisOptions::default()),
            "No missing values detected."
        );
    }

    #[test]
    fn test_placeholder_count() {
        let t = table(vec![
            ("status", strs(&["N/A", "ok", "TBD", "ok"])),
            ("clean", strs(&["x", "y", "z", "w"])),
        ]);
        let report = analyze(&t, AnalysisKind::Placeholders, &AnalysisOptions::default());
        assert!(report.contains("│ status │     2 │ 50.00% │"), "{report}");
        assert!(!report.contains("clean"));
    }

    #[test]
    fn test_nulls_are_not_placeholders() {
        let t = table(vec![("a", vec![Value::Null, Value::from("x")])]);
        assert_eq!(
            analyze(&t, AnalysisKind::Placeholders, &AnalysisOptions::default()),
            "No placeholders found."
        );
    }

    #[test]
    fn test_duplicate_counts() {
        let t = table(vec![
            ("x", vec![Value::Int(1), Value::Int(1), Value::Int(3)]),
            ("y", vec![Value::Int(2), Value::Int(2), Value::Int(4)]),
        ]);
        let report = analyze(&t, AnalysisKind::Duplicates, &AnalysisOptions::default());
        assert!(report.starts_with("Duplicate Report\n"));
        assert!(report.contains("│ Total Rows            │     3 │"), "{report}");
        assert!(report.contains("│ Duplicate entries     │     2 │"));
        assert!(report.contains("│ Unique duplicate rows │     1 │"));
    }

    #[test]
    fn test_duplicates_on_one_column() {
        let t = table(vec![
            ("x", vec![Value::Int(1), Value::Int(2), Value::Int(3)]),
            ("y", vec![Value::Int(5), Value::Int(5), Value::Int(6)]),
        ]);
        let mut options = AnalysisOptions::new();
        assert_eq!(
            analyze(&t, AnalysisKind::Duplicates, &options),
            "No duplicates. Checked 3 rows."
        );
        options.column("y");
        assert!(analyze(&t, AnalysisKind::Duplicates, &options).contains("Duplicate entries"));
    }

    #[test]
    fn test_special_characters() {
        let t = table(vec![
            ("email", strs(&["a@b.com", "plain", "c@d"])),
            ("word", strs(&["x", "y", "z"])),
        ]);
        let report = analyze(&t, AnalysisKind::SpecialCharacters, &AnalysisOptions::default());
        assert!(report.contains("│ email  │     2 │ .@    │"), "{report}");
        assert!(!report.contains("word"));
    }

    #[test]
    fn test_preview_limit_and_reverse() {
        let t = table(vec![("n", (0..20).map(Value::Int).collect())]);
        let mut options = AnalysisOptions::new();
        options.row_limit(3).reverse(true);
        let report = analyze(&t, AnalysisKind::Preview, &options);
        assert!(report.starts_with("[Data Types]\n"));
        assert!(report.contains("│ n      │ int64 │"), "{report}");
        let preview = report.split("[Preview]\n").nth(1).unwrap();
        assert!(preview.contains("│ 19 │ 19 │"), "{preview}");
        assert!(preview.contains("│ 17 │ 17 │"));
        assert!(!preview.contains("│ 16 │"));
    }

    #[test]
    fn test_unknown_column_uses_whole_table() {
        let t = table(vec![("a", strs(&["x"])), ("b", strs(&["y"]))]);
        let mut options = AnalysisOptions::new();
        options.column("nope");
        let report = analyze(&t, AnalysisKind::Preview, &options);
        assert!(report.contains("│ a ") && report.contains("│ b "));
    }

    #[test]
    fn test_unrecognized_name() {
        let t = table(vec![("a", strs(&["x"]))]);
        assert_eq!(
            analyze_named(&t, "Correlation", &AnalysisOptions::default()),
            "[Notice] Correlation not recognized."
        );
    }

    #[test]
    fn test_parse_row_limit() {
        assert_eq!(parse_row_limit(" 25 ").unwrap(), 25);
        assert!(parse_row_limit("ten").is_err());
        assert!(parse_row_limit("-1").is_err());
    }
}
