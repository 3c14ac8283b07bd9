use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, BooleanArray, Date32Array, Float64Array, Int64Array, LargeStringArray,
    StringArray, TimestampNanosecondArray,
};
use arrow::datatypes::{DataType, Field, Schema as ArrowSchema, SchemaRef, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use log::debug;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::arrow_writer::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::column::{Column, TimestampTzColumn};
use crate::error::{Error, Result};
use crate::frame::DataFrame;
use crate::schema::Schema;
use crate::typed_frame::TypedFrame;

/// Read a Parquet file against a declared schema.
///
/// Record batches are decoded through Arrow; the validation pass then
/// converts each column to its declared representation and enforces
/// constraints strictly.
pub fn read_parquet<P: AsRef<Path>>(path: P, schema: impl Into<Schema>) -> Result<TypedFrame> {
    let file = File::open(path.as_ref())?;

    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let arrow_schema = builder.schema().clone();
    let reader = builder.build()?;

    let mut batches = Vec::new();
    for batch in reader {
        batches.push(batch?);
    }

    let df = record_batches_to_dataframe(&batches, arrow_schema)?;
    TypedFrame::new(df, schema).validate(true)
}

/// Convert Arrow record batches to an engine DataFrame
fn record_batches_to_dataframe(batches: &[RecordBatch], schema: SchemaRef) -> Result<DataFrame> {
    let mut df = DataFrame::new();

    for (col_idx, field) in schema.fields().iter().enumerate() {
        let name = field.name().clone();
        let column = match field.data_type() {
            DataType::Int64 => {
                let mut values: Vec<Option<i64>> = Vec::new();
                for batch in batches {
                    let array = downcast::<Int64Array>(batch, col_idx, &name)?;
                    for i in 0..array.len() {
                        values.push((!array.is_null(i)).then(|| array.value(i)));
                    }
                }
                Column::int64_opt(values)
            }
            DataType::Float64 => {
                let mut values: Vec<Option<f64>> = Vec::new();
                for batch in batches {
                    let array = downcast::<Float64Array>(batch, col_idx, &name)?;
                    for i in 0..array.len() {
                        values.push((!array.is_null(i)).then(|| array.value(i)));
                    }
                }
                Column::float64_opt(values)
            }
            DataType::Boolean => {
                let mut values: Vec<Option<bool>> = Vec::new();
                for batch in batches {
                    let array = downcast::<BooleanArray>(batch, col_idx, &name)?;
                    for i in 0..array.len() {
                        values.push((!array.is_null(i)).then(|| array.value(i)));
                    }
                }
                Column::boolean_opt(values)
            }
            DataType::Utf8 => {
                let mut values: Vec<Option<String>> = Vec::new();
                for batch in batches {
                    let array = downcast::<StringArray>(batch, col_idx, &name)?;
                    for i in 0..array.len() {
                        values.push((!array.is_null(i)).then(|| array.value(i).to_string()));
                    }
                }
                Column::utf8_opt(values)
            }
            DataType::LargeUtf8 => {
                let mut values: Vec<Option<String>> = Vec::new();
                for batch in batches {
                    let array = downcast::<LargeStringArray>(batch, col_idx, &name)?;
                    for i in 0..array.len() {
                        values.push((!array.is_null(i)).then(|| array.value(i).to_string()));
                    }
                }
                Column::utf8_opt(values)
            }
            DataType::Date32 => {
                let mut values: Vec<Option<NaiveDate>> = Vec::new();
                for batch in batches {
                    let array = downcast::<Date32Array>(batch, col_idx, &name)?;
                    for i in 0..array.len() {
                        values.push(
                            (!array.is_null(i))
                                .then(|| NaiveDate::default() + Duration::days(array.value(i) as i64)),
                        );
                    }
                }
                Column::date_opt(values)
            }
            DataType::Timestamp(TimeUnit::Nanosecond, tz) => {
                let mut nanos: Vec<Option<i64>> = Vec::new();
                for batch in batches {
                    let array = downcast::<TimestampNanosecondArray>(batch, col_idx, &name)?;
                    for i in 0..array.len() {
                        nanos.push((!array.is_null(i)).then(|| array.value(i)));
                    }
                }
                match tz {
                    Some(tz_name) => {
                        let tz: Tz = tz_name.parse().map_err(|_| {
                            Error::Format(format!(
                                "Unknown timezone '{}' on column '{}'",
                                tz_name, name
                            ))
                        })?;
                        let values = nanos
                            .into_iter()
                            .map(|v| {
                                v.map(|n| nanos_to_utc(n, &name).map(|dt| dt.with_timezone(&tz)))
                                    .transpose()
                            })
                            .collect::<Result<Vec<_>>>()?;
                        Column::TimestampTz(TimestampTzColumn::from_options(tz, values))
                    }
                    None => {
                        let values = nanos
                            .into_iter()
                            .map(|v| {
                                v.map(|n| nanos_to_utc(n, &name).map(|dt| dt.naive_utc()))
                                    .transpose()
                            })
                            .collect::<Result<Vec<_>>>()?;
                        Column::timestamp_opt(values)
                    }
                }
            }
            other => {
                return Err(Error::Format(format!(
                    "Unsupported Parquet type {:?} for column '{}'",
                    other, name
                )))
            }
        };
        df.add_column(name, column)?;
    }

    Ok(df)
}

fn downcast<'a, T: 'static>(batch: &'a RecordBatch, col_idx: usize, name: &str) -> Result<&'a T> {
    batch
        .column(col_idx)
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| Error::Cast(format!("Failed to decode Parquet column '{}'", name)))
}

fn nanos_to_utc(nanos: i64, name: &str) -> Result<DateTime<Utc>> {
    let secs = nanos.div_euclid(1_000_000_000);
    let nsecs = nanos.rem_euclid(1_000_000_000) as u32;
    DateTime::from_timestamp(secs, nsecs).ok_or_else(|| {
        Error::Format(format!(
            "Timestamp out of range in Parquet column '{}'",
            name
        ))
    })
}

/// Write a frame to a Parquet file, returning the frame for chaining
pub fn write_parquet<'a, P: AsRef<Path>>(
    frame: &'a TypedFrame,
    path: P,
) -> Result<&'a TypedFrame> {
    let df = frame.data();

    let mut fields = Vec::with_capacity(df.column_count());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(df.column_count());
    for name in df.column_names() {
        let column = df.column(name)?;
        let (data_type, array) = column_to_arrow(column, name)?;
        fields.push(Field::new(name, data_type, true));
        arrays.push(array);
    }

    let schema_ref = Arc::new(ArrowSchema::new(fields));
    let batch = RecordBatch::try_new(schema_ref.clone(), arrays)?;

    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let file = File::create(path.as_ref())?;
    let mut writer = ArrowWriter::try_new(file, schema_ref, Some(props))?;
    writer.write(&batch)?;
    writer.close()?;

    debug!("wrote {} rows to parquet", df.row_count());
    Ok(frame)
}

fn column_to_arrow(column: &Column, name: &str) -> Result<(DataType, ArrayRef)> {
    match column {
        Column::Int64(col) => {
            let values: Vec<Option<i64>> = col.iter().map(|v| v.copied()).collect();
            Ok((DataType::Int64, Arc::new(Int64Array::from(values))))
        }
        Column::Float64(col) => {
            let values: Vec<Option<f64>> = col.iter().map(|v| v.copied()).collect();
            Ok((DataType::Float64, Arc::new(Float64Array::from(values))))
        }
        Column::Boolean(col) => {
            let values: Vec<Option<bool>> = col.iter().map(|v| v.copied()).collect();
            Ok((DataType::Boolean, Arc::new(BooleanArray::from(values))))
        }
        Column::String(col) => {
            let values: Vec<Option<String>> = col.iter().map(|v| v.cloned()).collect();
            Ok((DataType::Utf8, Arc::new(StringArray::from(values))))
        }
        Column::Date(col) => {
            let values: Vec<Option<i32>> = col
                .iter()
                .map(|v| v.map(|d| (*d - NaiveDate::default()).num_days() as i32))
                .collect();
            Ok((DataType::Date32, Arc::new(Date32Array::from(values))))
        }
        Column::Timestamp(col) => {
            let values = col
                .iter()
                .map(|v| v.map(|dt| naive_to_nanos(dt, name)).transpose())
                .collect::<Result<Vec<Option<i64>>>>()?;
            Ok((
                DataType::Timestamp(TimeUnit::Nanosecond, None),
                Arc::new(TimestampNanosecondArray::from(values)),
            ))
        }
        Column::TimestampTz(col) => {
            let tz_name: Arc<str> = Arc::from(col.tz().name());
            let values = col
                .iter()
                .map(|v| {
                    v.map(|dt| {
                        dt.timestamp_nanos_opt().ok_or_else(|| {
                            Error::Format(format!(
                                "Timestamp out of range in column '{}'",
                                name
                            ))
                        })
                    })
                    .transpose()
                })
                .collect::<Result<Vec<Option<i64>>>>()?;
            Ok((
                DataType::Timestamp(TimeUnit::Nanosecond, Some(tz_name.clone())),
                Arc::new(TimestampNanosecondArray::from(values).with_timezone(tz_name)),
            ))
        }
    }
}

fn naive_to_nanos(dt: &NaiveDateTime, name: &str) -> Result<i64> {
    dt.and_utc().timestamp_nanos_opt().ok_or_else(|| {
        Error::Format(format!("Timestamp out of range in column '{}'", name))
    })
}
