//! Excel workbooks: `calamine` for reading, `rust_xlsxwriter` for writing.
//!
//! Only the first worksheet is read and its first row is the header.

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use rust_xlsxwriter::Workbook;

use crate::error::{DatascopeError, Result};
use crate::table::{Column, Table, Value, unique_names};

const MAX_ROWS: usize = 1_048_576;
const MAX_COLUMNS: usize = 16_384;

/// Load the first worksheet of an `.xls` or `.xlsx` workbook.
pub(crate) fn read(path: &Path) -> Result<Table> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| DatascopeError::Malformed(format!("{} has no worksheets", path.display())))??;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(Table::default());
    };
    let names = unique_names(
        header
            .iter()
            .enumerate()
            .map(|(i, cell)| match cell {
                Data::Empty => format!("Unnamed: {i}"),
                other => other.to_string(),
            })
            .collect(),
    );

    let mut columns: Vec<Vec<Value>> = vec![Vec::with_capacity(range.height()); names.len()];
    for row in rows {
        for (column, cell) in columns.iter_mut().zip(row) {
            column.push(to_value(cell));
        }
    }

    let columns = names
        .into_iter()
        .zip(columns)
        .map(|(name, values)| Column::new(name, unify_numbers(values)))
        .collect();
    Table::new(columns)
}

fn to_value(cell: &Data) -> Value {
    match cell {
        Data::Empty | Data::Error(_) => Value::Null,
        Data::Bool(b) => Value::Bool(*b),
        Data::Int(i) => Value::Int(*i),
        Data::Float(x) => Value::Float(*x),
        Data::String(s) if s.is_empty() => Value::Null,
        Data::String(s) => Value::Str(s.clone()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::Str(s.clone()),
        other => Value::Str(other.to_string()),
    }
}

/// Excel stores every number as a double. A column whose numbers are all
/// integral becomes integers; otherwise all of them stay floats.
fn unify_numbers(mut values: Vec<Value>) -> Vec<Value> {
    let all_integral = values.iter().all(|v| match v {
        Value::Float(x) => x.fract() == 0.0 && x.abs() < 9.0e15,
        _ => true,
    });
    for v in &mut values {
        match *v {
            Value::Float(x) if all_integral => *v = Value::Int(x as i64),
            Value::Int(i) if !all_integral => *v = Value::Float(i as f64),
            _ => {}
        }
    }
    values
}

/// Write a table to the first worksheet of a new `.xlsx` workbook.
pub(crate) fn write(table: &Table, path: &Path) -> Result<()> {
    if table.num_rows() + 1 > MAX_ROWS || table.num_columns() > MAX_COLUMNS {
        return Err(DatascopeError::Validation(format!(
            "{} rows x {} columns exceeds the worksheet limit of {MAX_ROWS} x {MAX_COLUMNS}",
            table.num_rows(),
            table.num_columns()
        )));
    }

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, column) in table.columns().iter().enumerate() {
        let col = col as u16;
        sheet.write_string(0, col, column.name())?;
        for (idx, value) in column.values().iter().enumerate() {
            let row = idx as u32 + 1;
            match value {
                Value::Null => {}
                Value::Float(x) if x.is_nan() => {}
                Value::Bool(b) => {
                    sheet.write_boolean(row, col, *b)?;
                }
                Value::Int(i) => {
                    sheet.write_number(row, col, *i as f64)?;
                }
                Value::Float(x) => {
                    sheet.write_number(row, col, *x)?;
                }
                Value::Str(s) => {
                    sheet.write_string(row, col, s)?;
                }
            }
        }
    }
    workbook.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new(vec![
            Column::new("id", vec![Value::Int(1), Value::Int(2), Value::Int(3)]),
            Column::new("price", vec![Value::Float(1.5), Value::Float(2.0), Value::Null]),
            Column::new("name", vec![Value::from("a"), Value::Null, Value::from("c")]),
            Column::new("flag", vec![Value::Bool(true), Value::Bool(false), Value::Null]),
        ])
        .unwrap()
    }

    #[test]
    fn test_write_and_read_back() {
        let out = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        write(&sample(), out.path()).unwrap();

        let back = read(out.path()).unwrap();
        assert_eq!(back.column_names(), vec!["id", "price", "name", "flag"]);
        assert_eq!(back.num_rows(), 3);
        assert_eq!(back.column("id").unwrap().values()[2], Value::Int(3));
        assert_eq!(back.column("price").unwrap().values()[1], Value::Float(2.0));
        assert!(back.column("price").unwrap().values()[2].is_null());
        assert!(back.column("name").unwrap().values()[1].is_null());
        assert_eq!(back.column("flag").unwrap().values()[0], Value::Bool(true));
    }

    #[test]
    fn test_unify_numbers() {
        let ints = unify_numbers(vec![Value::Float(1.0), Value::Null, Value::Float(4.0)]);
        assert_eq!(ints, vec![Value::Int(1), Value::Null, Value::Int(4)]);
        let floats = unify_numbers(vec![Value::Int(1), Value::Float(0.5)]);
        assert_eq!(floats, vec![Value::Float(1.0), Value::Float(0.5)]);
    }

    #[test]
    fn test_not_a_workbook() {
        let mut file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        std::io::Write::write_all(&mut file, b"not a zip").unwrap();
        assert!(read(file.path()).is_err());
    }
}
