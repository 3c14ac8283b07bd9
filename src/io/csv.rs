use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, Writer};
use log::debug;

use crate::column::{Column, StringColumn};
use crate::error::Result;
use crate::frame::DataFrame;
use crate::schema::Schema;
use crate::typed_frame::TypedFrame;

/// Read a CSV file against a declared schema.
///
/// The first row is taken as the header. Every field is parsed as text by the
/// engine (empty fields become nulls); the validation pass converts each
/// column to its declared representation and enforces constraints strictly.
pub fn read_csv<P: AsRef<Path>>(path: P, schema: impl Into<Schema>) -> Result<TypedFrame> {
    let file = File::open(path.as_ref())?;
    read_csv_from(file, schema)
}

/// Read CSV from any reader against a declared schema
pub fn read_csv_from<R: Read>(reader: R, schema: impl Into<Schema>) -> Result<TypedFrame> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();

    let mut columns: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for record in rdr.records() {
        let record = record?;
        for (i, values) in columns.iter_mut().enumerate() {
            match record.get(i) {
                Some("") | None => values.push(None),
                Some(field) => values.push(Some(field.to_string())),
            }
        }
    }

    debug!("read {} csv columns", headers.len());
    let mut df = DataFrame::new();
    for (header, values) in headers.into_iter().zip(columns) {
        df.add_column(header, Column::String(StringColumn::from_options(values)))?;
    }

    TypedFrame::new(df, schema).validate(true)
}

/// Write a frame to a CSV file, returning the frame for chaining
pub fn write_csv<'a, P: AsRef<Path>>(frame: &'a TypedFrame, path: P) -> Result<&'a TypedFrame> {
    let file = File::create(path.as_ref())?;
    write_csv_to(frame, file)
}

/// Write a frame as CSV to any writer, returning the frame for chaining
pub fn write_csv_to<'a, W: Write>(frame: &'a TypedFrame, writer: W) -> Result<&'a TypedFrame> {
    let mut wtr = Writer::from_writer(writer);

    let df = frame.data();
    wtr.write_record(df.column_names())?;

    for row in 0..df.row_count() {
        let mut record = Vec::with_capacity(df.column_count());
        for name in df.column_names() {
            let value = df.column(name)?.format_value(row).unwrap_or_default();
            record.push(value);
        }
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(frame)
}
