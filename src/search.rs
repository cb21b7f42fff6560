//! Text search over table cells.

use tracing::warn;

use crate::table::{Column, Table};

/// How [`search`] matches cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOptions {
    column: Option<String>,
    case_sensitive: bool,
    whole_word: bool,
}

impl SearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only test cells of this column.
    pub fn column(&mut self, name: impl Into<String>) -> &mut Self {
        self.column = Some(name.into());
        self
    }

    /// Compare without case folding.
    pub fn case_sensitive(&mut self, yes: bool) -> &mut Self {
        self.case_sensitive = yes;
        self
    }

    /// Require the whole cell to equal the term instead of containing it.
    pub fn whole_word(&mut self, yes: bool) -> &mut Self {
        self.whole_word = yes;
        self
    }
}

/// Row indices, ascending and without repeats, whose cells match `term`.
///
/// Cells are compared through their text form. An empty term matches
/// nothing, and so does a column filter naming a missing column.
pub fn search(table: &Table, term: &str, options: &SearchOptions) -> Vec<usize> {
    if term.is_empty() {
        return Vec::new();
    }
    let columns: Vec<&Column> = match options.column.as_deref() {
        Some(name) => match table.column(name) {
            Some(col) => vec![col],
            None => {
                warn!("Search column {name:?} not found");
                return Vec::new();
            }
        },
        None => table.columns().iter().collect(),
    };

    let needle = if options.case_sensitive {
        term.to_string()
    } else {
        term.to_lowercase()
    };
    let matches = |text: String| {
        let text = if options.case_sensitive {
            text
        } else {
            text.to_lowercase()
        };
        if options.whole_word {
            text == needle
        } else {
            text.contains(needle.as_str())
        }
    };

    (0..table.num_rows())
        .filter(|&idx| columns.iter().any(|c| matches(c.values()[idx].to_string())))
        .collect()
}
