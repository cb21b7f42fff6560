//! JSON datasets.
//!
//! Accepted shapes:
//! - an array of record objects: `[{"a": 1, "b": "x"}, ...]`
//! - an object of column arrays: `{"a": [1, 2], "b": ["x", "y"]}`
//! - an object of column objects keyed by row label: `{"a": {"0": 1, "1": 2}}`
//!
//! Tables are written in the column-array shape so that a table without rows
//! keeps its columns.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write as _};
use std::path::Path;

use serde_json::{Map, Number, Value as Json};

use crate::error::{DatascopeError, IoResultExt as _, Result};
use crate::table::{Column, Table, Value};

/// Load a JSON dataset.
pub(crate) fn read(path: &Path) -> Result<Table> {
    let file = File::open(path).at_path(path)?;
    let doc: Json = serde_json::from_reader(BufReader::new(file))?;
    from_json(doc)
}

/// Build a table from a parsed JSON document.
pub fn from_json(doc: Json) -> Result<Table> {
    match doc {
        Json::Array(records) => from_records(records),
        Json::Object(columns) => from_columns(columns),
        other => Err(DatascopeError::Malformed(format!(
            "expected a JSON array or object at top level, found {}",
            json_kind(&other)
        ))),
    }
}

fn from_records(records: Vec<Json>) -> Result<Table> {
    let mut names: Vec<String> = Vec::new();
    let mut objects = Vec::with_capacity(records.len());
    for (idx, record) in records.into_iter().enumerate() {
        let map = match record {
            Json::Object(map) => map,
            other => {
                return Err(DatascopeError::Malformed(format!(
                    "record {idx} is {}, expected an object",
                    json_kind(&other)
                )));
            }
        };
        for key in map.keys() {
            if !names.iter().any(|n| n == key) {
                names.push(key.clone());
            }
        }
        objects.push(map);
    }

    let columns = names
        .into_iter()
        .map(|name| {
            let values = objects
                .iter_mut()
                .map(|obj| obj.remove(&name).map_or(Value::Null, to_value))
                .collect();
            Column::new(name, values)
        })
        .collect();
    Table::new(columns)
}

fn from_columns(columns: Map<String, Json>) -> Result<Table> {
    let mut out = Vec::with_capacity(columns.len());
    for (name, cells) in columns {
        let values = match cells {
            Json::Array(items) => items.into_iter().map(to_value).collect(),
            Json::Object(by_label) => by_label.into_iter().map(|(_, v)| to_value(v)).collect(),
            other => {
                return Err(DatascopeError::Malformed(format!(
                    "column {name:?} is {}, expected an array or object",
                    json_kind(&other)
                )));
            }
        };
        out.push(Column::new(name, values));
    }
    Table::new(out).map_err(|e| DatascopeError::Malformed(e.to_string()))
}

fn to_value(json: Json) -> Value {
    match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(b),
        Json::Number(n) => n
            .as_i64()
            .map(Value::Int)
            .or_else(|| n.as_f64().map(Value::Float))
            .unwrap_or_else(|| Value::Str(n.to_string())),
        Json::String(s) => Value::Str(s),
        // Nested structures are kept as their JSON text
        nested => Value::Str(nested.to_string()),
    }
}

fn to_json(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(i) => Json::Number((*i).into()),
        Value::Float(x) => Number::from_f64(*x).map_or(Json::Null, Json::Number),
        Value::Str(s) => Json::String(s.clone()),
    }
}

fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "a boolean",
        Json::Number(_) => "a number",
        Json::String(_) => "a string",
        Json::Array(_) => "an array",
        Json::Object(_) => "an object",
    }
}

/// Write a table as an object of column arrays.
pub(crate) fn write(table: &Table, path: &Path) -> Result<()> {
    let doc: Map<String, Json> = table
        .columns()
        .iter()
        .map(|c| {
            let cells = c.values().iter().map(to_json).collect();
            (c.name().to_string(), Json::Array(cells))
        })
        .collect();

    let file = File::create(path).at_path(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, &Json::Object(doc))?;
    writer.write_all(b"\n").at_path(path)?;
    writer.flush().at_path(path)?;
    Ok(())
}
