//! Box-drawn text tables for analysis reports.

/// A text table rendered with box-drawing characters:
///
/// ```text
/// ╒════════╤═══════╕
/// │ Column │ Count │
/// ╞════════╪═══════╡
/// │ a      │     2 │
/// ╘════════╧═══════╛
/// ```
///
/// Columns whose cells are all numeric are right-aligned.
#[derive(Debug, Clone, Default)]
pub(crate) struct Grid {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Grid {
    pub(crate) fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(|h| single_line(h.into())).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row; missing cells render empty, extra cells are ignored.
    pub(crate) fn push_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut row: Vec<String> = cells.into_iter().map(|c| single_line(c.into())).collect();
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    pub(crate) fn render(&self) -> String {
        let ncols = self.headers.len();
        let widths: Vec<usize> = (0..ncols)
            .map(|c| {
                self.rows
                    .iter()
                    .map(|r| display_width(&r[c]))
                    .chain(std::iter::once(display_width(&self.headers[c])))
                    .max()
                    .unwrap_or(0)
            })
            .collect();
        let right: Vec<bool> = (0..ncols)
            .map(|c| {
                let cells: Vec<&str> = self
                    .rows
                    .iter()
                    .map(|r| r[c].trim())
                    .filter(|s| !s.is_empty())
                    .collect();
                !cells.is_empty() && cells.iter().all(|s| s.parse::<f64>().is_ok())
            })
            .collect();

        let mut out = String::new();
        rule(&mut out, &widths, '╒', '═', '╤', '╕');
        line(&mut out, &self.headers, &widths, &right);
        if self.rows.is_empty() {
            rule(&mut out, &widths, '╘', '═', '╧', '╛');
        } else {
            rule(&mut out, &widths, '╞', '═', '╪', '╡');
            for (i, row) in self.rows.iter().enumerate() {
                if i > 0 {
                    rule(&mut out, &widths, '├', '─', '┼', '┤');
                }
                line(&mut out, row, &widths, &right);
            }
            rule(&mut out, &widths, '╘', '═', '╧', '╛');
        }
        out.pop();
        out
    }
}

/// Line breaks inside a cell are shown escaped so each row stays on one line.
fn single_line(cell: String) -> String {
    if cell.contains(['\n', '\r']) {
        cell.replace("\r\n", "\\n").replace(['\n', '\r'], "\\n")
    } else {
        cell
    }
}

fn display_width(s: &str) -> usize {
    s.chars().count()
}

fn rule(out: &mut String, widths: &[usize], left: char, fill: char, join: char, end: char) {
    out.push(left);
    for (i, w) in widths.iter().enumerate() {
        if i > 0 {
            out.push(join);
        }
        out.extend(std::iter::repeat_n(fill, w + 2));
    }
    out.push(end);
    out.push('\n');
}

fn line(out: &mut String, cells: &[String], widths: &[usize], right: &[bool]) {
    out.push('│');
    for (i, (cell, w)) in cells.iter().zip(widths).enumerate() {
        if i > 0 {
            out.push('│');
        }
        // `cell` may hold multi-byte characters; pad by char count
        let pad = w - display_width(cell);
        let padding = " ".repeat(pad);
        if right[i] {
            out.push_str(&format!(" {padding}{cell} "));
        } else {
            out.push_str(&format!(" {cell}{padding} "));
        }
    }
    out.push('│');
    out.push('\n');
}
