use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use log::debug;
use serde_json::{Map, Number, Value};

use crate::column::Column;
use crate::error::{Error, Result};
use crate::frame::DataFrame;
use crate::schema::Schema;
use crate::typed_frame::TypedFrame;

/// Read a JSON file against a declared schema.
///
/// Accepts record-oriented input (an array of objects) or column-oriented
/// input (an object of arrays). The engine infers a provisional column type
/// from the JSON values; the validation pass converts to the declared
/// representations and enforces constraints strictly.
pub fn read_json<P: AsRef<Path>>(path: P, schema: impl Into<Schema>) -> Result<TypedFrame> {
    let file = File::open(path.as_ref())?;
    let reader = BufReader::new(file);
    let json_value: Value = serde_json::from_reader(reader)?;

    let df = match json_value {
        Value::Array(array) => read_records_array(array)?,
        Value::Object(map) => read_column_oriented(map)?,
        _ => {
            return Err(Error::Format(
                "JSON must be an object or an array".to_string(),
            ))
        }
    };

    TypedFrame::new(df, schema).validate(true)
}

// Read record-oriented JSON
fn read_records_array(array: Vec<Value>) -> Result<DataFrame> {
    // Collect keys in first-appearance order
    let mut keys: Vec<String> = Vec::new();
    for item in &array {
        match item {
            Value::Object(map) => {
                for key in map.keys() {
                    if !keys.contains(key) {
                        keys.push(key.clone());
                    }
                }
            }
            _ => {
                return Err(Error::Format(
                    "Each element of the array must be an object".to_string(),
                ))
            }
        }
    }

    debug!("read {} json record columns", keys.len());
    let mut df = DataFrame::new();
    for key in keys {
        let values: Vec<Option<Value>> = array
            .iter()
            .map(|item| match item {
                Value::Object(map) => map.get(&key).filter(|v| !v.is_null()).cloned(),
                _ => None,
            })
            .collect();
        df.add_column(key, build_column(values))?;
    }
    Ok(df)
}

// Read column-oriented JSON
fn read_column_oriented(map: Map<String, Value>) -> Result<DataFrame> {
    let mut df = DataFrame::new();
    for (key, value) in map {
        match value {
            Value::Array(array) => {
                let values: Vec<Option<Value>> = array
                    .into_iter()
                    .map(|v| if v.is_null() { None } else { Some(v) })
                    .collect();
                df.add_column(key, build_column(values))?;
            }
            _ => {
                return Err(Error::Format(format!(
                    "Column '{}' must be an array",
                    key
                )))
            }
        }
    }
    Ok(df)
}

/// Pick the narrowest engine column type holding every non-null value
fn build_column(values: Vec<Option<Value>>) -> Column {
    let non_null: Vec<&Value> = values.iter().flatten().collect();
    if !non_null.is_empty() && non_null.iter().all(|v| v.is_boolean()) {
        Column::boolean_opt(
            values
                .iter()
                .map(|v| v.as_ref().and_then(Value::as_bool))
                .collect(),
        )
    } else if !non_null.is_empty() && non_null.iter().all(|v| v.as_i64().is_some()) {
        Column::int64_opt(
            values
                .iter()
                .map(|v| v.as_ref().and_then(Value::as_i64))
                .collect(),
        )
    } else if !non_null.is_empty() && non_null.iter().all(|v| v.is_number()) {
        Column::float64_opt(
            values
                .iter()
                .map(|v| v.as_ref().and_then(Value::as_f64))
                .collect(),
        )
    } else {
        Column::utf8_opt(
            values
                .iter()
                .map(|v| {
                    v.as_ref().map(|value| match value {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                })
                .collect::<Vec<Option<String>>>(),
        )
    }
}

/// Write a frame as record-oriented JSON, returning the frame for chaining
pub fn write_json<'a, P: AsRef<Path>>(frame: &'a TypedFrame, path: P) -> Result<&'a TypedFrame> {
    let file = File::create(path.as_ref())?;
    let writer = BufWriter::new(file);

    let df = frame.data();
    let mut records = Vec::with_capacity(df.row_count());
    for row in 0..df.row_count() {
        let mut record = Map::new();
        for name in df.column_names() {
            record.insert(name.clone(), cell_to_value(df.column(name)?, row));
        }
        records.push(Value::Object(record));
    }

    serde_json::to_writer(writer, &Value::Array(records))?;
    Ok(frame)
}

fn cell_to_value(column: &Column, row: usize) -> Value {
    if column.is_null(row) {
        return Value::Null;
    }
    match column {
        Column::Int64(col) => col
            .get(row)
            .ok()
            .flatten()
            .map(|v| Value::Number(Number::from(*v)))
            .unwrap_or(Value::Null),
        Column::Float64(col) => col
            .get(row)
            .ok()
            .flatten()
            .and_then(|v| Number::from_f64(*v))
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Column::Boolean(col) => col
            .get(row)
            .ok()
            .flatten()
            .map(|v| Value::Bool(*v))
            .unwrap_or(Value::Null),
        _ => column
            .format_value(row)
            .map(Value::String)
            .unwrap_or(Value::Null),
    }
}
