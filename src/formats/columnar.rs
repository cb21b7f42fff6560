//! Parquet reading and writing through Arrow record batches.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, AsArray, BooleanArray, Float64Array, Int64Array, StringArray,
};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field, Float64Type, Int64Type, Schema};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use arrow::util::display::array_value_to_string;
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::error::{DatascopeError, IoResultExt as _, Result};
use crate::field_type::Type;
use crate::table::{Column, Table, Value};

/// Load every row group of a Parquet file.
pub(crate) fn read(path: &Path) -> Result<Table> {
    let file = File::open(path).at_path(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let schema = builder.schema().clone();
    let reader = builder.build()?;

    let mut columns: Vec<Vec<Value>> = vec![Vec::new(); schema.fields().len()];
    for batch in reader {
        let batch = batch?;
        for (values, array) in columns.iter_mut().zip(batch.columns()) {
            append_values(array, values)?;
        }
    }

    let columns = schema
        .fields()
        .iter()
        .zip(columns)
        .map(|(field, values)| Column::new(field.name().clone(), values))
        .collect();
    Table::new(columns)
}

/// Convert one Arrow array into cell values.
fn append_values(array: &ArrayRef, out: &mut Vec<Value>) -> Result<()> {
    out.reserve(array.len());
    match array.data_type() {
        DataType::Boolean => {
            let bools = array.as_boolean();
            out.extend(bools.iter().map(Value::from));
        }
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32 => {
            let ints = cast(array, &DataType::Int64)?;
            let ints = ints.as_primitive::<Int64Type>();
            out.extend(ints.iter().map(Value::from));
        }
        DataType::UInt64 | DataType::Float16 | DataType::Float32 | DataType::Float64 => {
            let floats = cast(array, &DataType::Float64)?;
            let floats = floats.as_primitive::<Float64Type>();
            out.extend(floats.iter().map(Value::from));
        }
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => {
            let strings = cast(array, &DataType::Utf8)?;
            let strings = strings.as_string::<i32>();
            out.extend(strings.iter().map(Value::from));
        }
        _ => {
            for i in 0..array.len() {
                if array.is_null(i) {
                    out.push(Value::Null);
                } else {
                    out.push(Value::Str(array_value_to_string(array, i)?));
                }
            }
        }
    }
    Ok(())
}

/// Arrow column for one table column, typed by its merged value type.
fn to_array(column: &Column) -> (DataType, ArrayRef) {
    let values = column.values();
    match column.dtype() {
        Type::Boolean => {
            let array: BooleanArray = values
                .iter()
                .map(|v| match v {
                    Value::Bool(b) => Some(*b),
                    _ => None,
                })
                .collect();
            (DataType::Boolean, Arc::new(array))
        }
        Type::Integer => {
            let array: Int64Array = values
                .iter()
                .map(|v| match v {
                    Value::Int(i) => Some(*i),
                    _ => None,
                })
                .collect();
            (DataType::Int64, Arc::new(array))
        }
        Type::Float => {
            let array: Float64Array = values
                .iter()
                .map(|v| match v {
                    Value::Int(i) => Some(*i as f64),
                    Value::Float(x) => Some(*x),
                    _ => None,
                })
                .collect();
            (DataType::Float64, Arc::new(array))
        }
        Type::Null | Type::Text => {
            let array: StringArray = values
                .iter()
                .map(|v| (!matches!(v, Value::Null)).then(|| v.to_string()))
                .collect();
            (DataType::Utf8, Arc::new(array))
        }
    }
}

/// Write a table as a single-batch Parquet file.
pub(crate) fn write(table: &Table, path: &Path) -> Result<()> {
    if table.num_columns() == 0 {
        return Err(DatascopeError::Validation(
            "cannot write a Parquet file without columns".to_string(),
        ));
    }
    let (fields, arrays): (Vec<Field>, Vec<ArrayRef>) = table
        .columns()
        .iter()
        .map(|c| {
            let (dtype, array) = to_array(c);
            (Field::new(c.name(), dtype, true), array)
        })
        .unzip();
    let schema = Arc::new(Schema::new(fields));
    let options = RecordBatchOptions::new().with_row_count(Some(table.num_rows()));
    let batch = RecordBatch::try_new_with_options(schema.clone(), arrays, &options)?;

    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let file = File::create(path).at_path(path)?;
    let mut writer = ArrowWriter::try_new(file, schema, Some(props))?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}
