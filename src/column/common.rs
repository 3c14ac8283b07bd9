use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::column::value_column::{
    epoch_in, BooleanColumn, DateColumn, Float64Column, Int64Column, StringColumn,
    TimestampColumn, TimestampTzColumn,
};
use crate::error::{Error, Result};

/// Enum naming the physical representation of a column.
///
/// A representation is always declared, never inferred from data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhysicalType {
    Int64,
    Float64,
    Utf8,
    Boolean,
    Date,
    Timestamp,
    TimestampTz(Tz),
}

impl fmt::Display for PhysicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhysicalType::Int64 => write!(f, "int64"),
            PhysicalType::Float64 => write!(f, "float64"),
            PhysicalType::Utf8 => write!(f, "utf8"),
            PhysicalType::Boolean => write!(f, "bool"),
            PhysicalType::Date => write!(f, "date"),
            PhysicalType::Timestamp => write!(f, "timestamp"),
            PhysicalType::TimestampTz(tz) => write!(f, "timestamp[{}]", tz),
        }
    }
}

/// Utility functions for null bitmasks
pub(crate) mod utils {
    use std::sync::Arc;

    /// Build a bitmask from per-row null flags
    pub fn create_bitmask(nulls: &[bool]) -> Arc<[u8]> {
        let bytes_needed = (nulls.len() + 7) / 8;
        let mut data = vec![0u8; bytes_needed];

        for (i, &is_null) in nulls.iter().enumerate() {
            if is_null {
                data[i / 8] |= 1 << (i % 8);
            }
        }

        data.into()
    }

    /// Check whether a bit is set
    pub fn is_set(mask: &[u8], index: usize) -> bool {
        let byte_idx = index / 8;
        byte_idx < mask.len() && (mask[byte_idx] & (1 << (index % 8))) != 0
    }
}

/// Enum representing a column of any supported physical type
#[derive(Debug, Clone)]
pub enum Column {
    Int64(Int64Column),
    Float64(Float64Column),
    String(StringColumn),
    Boolean(BooleanColumn),
    Date(DateColumn),
    Timestamp(TimestampColumn),
    TimestampTz(TimestampTzColumn),
}

impl Column {
    pub fn int64(data: Vec<i64>) -> Self {
        Column::Int64(Int64Column::new(data))
    }

    pub fn int64_opt(data: Vec<Option<i64>>) -> Self {
        Column::Int64(Int64Column::from_options(data))
    }

    pub fn float64(data: Vec<f64>) -> Self {
        Column::Float64(Float64Column::new(data))
    }

    pub fn float64_opt(data: Vec<Option<f64>>) -> Self {
        Column::Float64(Float64Column::from_options(data))
    }

    pub fn utf8<I, S>(data: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Column::String(StringColumn::new(data.into_iter().map(Into::into).collect()))
    }

    pub fn utf8_opt<I, S>(data: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        Column::String(StringColumn::from_options(
            data.into_iter().map(|v| v.map(Into::into)).collect(),
        ))
    }

    pub fn boolean(data: Vec<bool>) -> Self {
        Column::Boolean(BooleanColumn::new(data))
    }

    pub fn boolean_opt(data: Vec<Option<bool>>) -> Self {
        Column::Boolean(BooleanColumn::from_options(data))
    }

    pub fn date(data: Vec<NaiveDate>) -> Self {
        Column::Date(DateColumn::new(data))
    }

    pub fn date_opt(data: Vec<Option<NaiveDate>>) -> Self {
        Column::Date(DateColumn::from_options(data))
    }

    pub fn timestamp(data: Vec<NaiveDateTime>) -> Self {
        Column::Timestamp(TimestampColumn::new(data))
    }

    pub fn timestamp_opt(data: Vec<Option<NaiveDateTime>>) -> Self {
        Column::Timestamp(TimestampColumn::from_options(data))
    }

    pub fn timestamp_tz(tz: Tz, data: Vec<DateTime<Tz>>) -> Self {
        Column::TimestampTz(TimestampTzColumn::new(tz, data))
    }

    pub fn timestamp_tz_opt(tz: Tz, data: Vec<Option<DateTime<Tz>>>) -> Self {
        Column::TimestampTz(TimestampTzColumn::from_options(tz, data))
    }

    /// Number of rows in the column
    pub fn len(&self) -> usize {
        match self {
            Column::Int64(col) => col.len(),
            Column::Float64(col) => col.len(),
            Column::String(col) => col.len(),
            Column::Boolean(col) => col.len(),
            Column::Date(col) => col.len(),
            Column::Timestamp(col) => col.len(),
            Column::TimestampTz(col) => col.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The column's physical representation
    pub fn physical_type(&self) -> PhysicalType {
        match self {
            Column::Int64(_) => PhysicalType::Int64,
            Column::Float64(_) => PhysicalType::Float64,
            Column::String(_) => PhysicalType::Utf8,
            Column::Boolean(_) => PhysicalType::Boolean,
            Column::Date(_) => PhysicalType::Date,
            Column::Timestamp(_) => PhysicalType::Timestamp,
            Column::TimestampTz(col) => PhysicalType::TimestampTz(col.tz()),
        }
    }

    /// Whether the value at the given index is null
    pub fn is_null(&self, index: usize) -> bool {
        match self {
            Column::Int64(col) => col.is_null(index),
            Column::Float64(col) => col.is_null(index),
            Column::String(col) => col.is_null(index),
            Column::Boolean(col) => col.is_null(index),
            Column::Date(col) => col.is_null(index),
            Column::Timestamp(col) => col.is_null(index),
            Column::TimestampTz(col) => col.is_null(index),
        }
    }

    /// Number of null values
    pub fn null_count(&self) -> usize {
        match self {
            Column::Int64(col) => col.null_count(),
            Column::Float64(col) => col.null_count(),
            Column::String(col) => col.null_count(),
            Column::Boolean(col) => col.null_count(),
            Column::Date(col) => col.null_count(),
            Column::Timestamp(col) => col.null_count(),
            Column::TimestampTz(col) => col.null_count(),
        }
    }

    /// Render the value at the given index as text, `None` when null.
    ///
    /// This is the canonical value rendering used for display, CSV output and
    /// join/group keys; temporal values use ISO formats that the string casts
    /// accept back.
    pub fn format_value(&self, index: usize) -> Option<String> {
        match self {
            Column::Int64(col) => col.format_value(index),
            Column::Float64(col) => col.format_value(index),
            Column::String(col) => col.format_value(index),
            Column::Boolean(col) => col.format_value(index),
            Column::Date(col) => col.format_value(index),
            Column::Timestamp(col) => col.format_value(index),
            Column::TimestampTz(col) => col.format_value(index),
        }
    }

    /// Compare the non-null values at two indices
    pub fn compare_values(&self, a: usize, b: usize) -> Option<Ordering> {
        match self {
            Column::Int64(col) => col.compare_values(a, b),
            Column::Float64(col) => col.compare_values(a, b),
            Column::String(col) => col.compare_values(a, b),
            Column::Boolean(col) => col.compare_values(a, b),
            Column::Date(col) => col.compare_values(a, b),
            Column::Timestamp(col) => col.compare_values(a, b),
            Column::TimestampTz(col) => col.compare_values(a, b),
        }
    }

    /// Gather rows by index; `None` entries produce nulls
    pub fn take(&self, indices: &[Option<usize>]) -> Column {
        match self {
            Column::Int64(col) => Column::Int64(col.take(indices)),
            Column::Float64(col) => Column::Float64(col.take(indices)),
            Column::String(col) => Column::String(col.take(indices)),
            Column::Boolean(col) => Column::Boolean(col.take(indices)),
            Column::Date(col) => Column::Date(col.take(indices)),
            Column::Timestamp(col) => Column::Timestamp(col.take(indices)),
            Column::TimestampTz(col) => Column::TimestampTz(col.take(indices)),
        }
    }

    /// Value-wise fallback onto `other`, used when join sides share a key
    /// column name. Both columns must have the same physical type.
    pub(crate) fn coalesce(&self, other: &Column) -> Result<Column> {
        match (self, other) {
            (Column::Int64(a), Column::Int64(b)) => Ok(Column::Int64(a.coalesce(b)?)),
            (Column::Float64(a), Column::Float64(b)) => Ok(Column::Float64(a.coalesce(b)?)),
            (Column::String(a), Column::String(b)) => Ok(Column::String(a.coalesce(b)?)),
            (Column::Boolean(a), Column::Boolean(b)) => Ok(Column::Boolean(a.coalesce(b)?)),
            (Column::Date(a), Column::Date(b)) => Ok(Column::Date(a.coalesce(b)?)),
            (Column::Timestamp(a), Column::Timestamp(b)) => Ok(Column::Timestamp(a.coalesce(b)?)),
            (Column::TimestampTz(a), Column::TimestampTz(b)) => {
                Ok(Column::TimestampTz(a.coalesce(b)?))
            }
            _ => Err(Error::Cast(format!(
                "cannot coalesce {} with {}",
                self.physical_type(),
                other.physical_type()
            ))),
        }
    }

    pub fn as_int64(&self) -> Option<&Int64Column> {
        match self {
            Column::Int64(col) => Some(col),
            _ => None,
        }
    }

    pub fn as_float64(&self) -> Option<&Float64Column> {
        match self {
            Column::Float64(col) => Some(col),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&StringColumn> {
        match self {
            Column::String(col) => Some(col),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<&BooleanColumn> {
        match self {
            Column::Boolean(col) => Some(col),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&DateColumn> {
        match self {
            Column::Date(col) => Some(col),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<&TimestampColumn> {
        match self {
            Column::Timestamp(col) => Some(col),
            _ => None,
        }
    }

    pub fn as_timestamp_tz(&self) -> Option<&TimestampTzColumn> {
        match self {
            Column::TimestampTz(col) => Some(col),
            _ => None,
        }
    }

    /// Convert the column to another physical representation.
    ///
    /// Nulls pass through untouched. Unsupported conversions and values that
    /// do not parse fail with a cast error.
    pub fn cast(&self, to: PhysicalType) -> Result<Column> {
        if self.physical_type() == to {
            return Ok(self.clone());
        }

        match (self, to) {
            (Column::Int64(col), PhysicalType::Float64) => Ok(Column::Float64(
                col.map_values_with(|v| Ok(*v as f64), 0.0)?,
            )),
            (Column::Int64(col), PhysicalType::Utf8) => Ok(Column::String(
                col.map_values_with(|v| Ok(v.to_string()), String::new())?,
            )),
            (Column::Int64(col), PhysicalType::Boolean) => Ok(Column::Boolean(
                col.map_values_with(|v| Ok(*v != 0), false)?,
            )),

            (Column::Float64(col), PhysicalType::Int64) => Ok(Column::Int64(
                col.map_values_with(
                    |v| {
                        if v.is_finite() {
                            Ok(*v as i64)
                        } else {
                            Err(Error::Cast(format!("cannot cast {} to int64", v)))
                        }
                    },
                    0,
                )?,
            )),
            (Column::Float64(col), PhysicalType::Utf8) => Ok(Column::String(
                col.map_values_with(|v| Ok(v.to_string()), String::new())?,
            )),

            (Column::String(col), PhysicalType::Int64) => {
                Ok(Column::Int64(col.map_values_with(|v| parse_i64(v), 0)?))
            }
            (Column::String(col), PhysicalType::Float64) => {
                Ok(Column::Float64(col.map_values_with(|v| parse_f64(v), 0.0)?))
            }
            (Column::String(col), PhysicalType::Boolean) => Ok(Column::Boolean(
                col.map_values_with(|v| parse_bool(v), false)?,
            )),
            (Column::String(col), PhysicalType::Date) => Ok(Column::Date(
                col.map_values_with(|v| parse_date(v), NaiveDate::default())?,
            )),
            (Column::String(col), PhysicalType::Timestamp) => Ok(Column::Timestamp(
                col.map_values_with(|v| parse_timestamp(v), NaiveDateTime::default())?,
            )),
            (Column::String(col), PhysicalType::TimestampTz(tz)) => {
                Ok(Column::TimestampTz(TimestampTzColumn {
                    values: col
                        .map_values_with(|v| parse_timestamp_tz(v, tz), epoch_in(tz))?,
                    tz,
                }))
            }

            (Column::Boolean(col), PhysicalType::Int64) => Ok(Column::Int64(
                col.map_values_with(|v| Ok(i64::from(*v)), 0)?,
            )),
            (Column::Boolean(col), PhysicalType::Float64) => Ok(Column::Float64(
                col.map_values_with(|v| Ok(if *v { 1.0 } else { 0.0 }), 0.0)?,
            )),
            (Column::Boolean(col), PhysicalType::Utf8) => Ok(Column::String(
                col.map_values_with(|v| Ok(v.to_string()), String::new())?,
            )),

            (Column::Date(col), PhysicalType::Timestamp) => Ok(Column::Timestamp(
                col.map_values_with(
                    |v| {
                        v.and_hms_opt(0, 0, 0)
                            .ok_or_else(|| Error::Cast(format!("cannot cast {} to timestamp", v)))
                    },
                    NaiveDateTime::default(),
                )?,
            )),
            (Column::Date(col), PhysicalType::Utf8) => Ok(Column::String(
                col.map_values_with(|v| Ok(v.to_string()), String::new())?,
            )),

            (Column::Timestamp(col), PhysicalType::Date) => Ok(Column::Date(
                col.map_values_with(|v| Ok(v.date()), NaiveDate::default())?,
            )),
            (Column::Timestamp(col), PhysicalType::Utf8) => Ok(Column::String(
                col.map_values_with(|v| Ok(v.to_string()), String::new())?,
            )),
            (Column::Timestamp(col), PhysicalType::TimestampTz(tz)) => {
                Ok(Column::TimestampTz(TimestampTzColumn {
                    values: col.map_values_with(
                        |v| Ok(Utc.from_utc_datetime(v).with_timezone(&tz)),
                        epoch_in(tz),
                    )?,
                    tz,
                }))
            }

            (Column::TimestampTz(col), PhysicalType::Timestamp) => Ok(Column::Timestamp(
                col.values
                    .map_values_with(|v| Ok(v.naive_utc()), NaiveDateTime::default())?,
            )),
            (Column::TimestampTz(col), PhysicalType::Date) => Ok(Column::Date(
                col.values
                    .map_values_with(|v| Ok(v.date_naive()), NaiveDate::default())?,
            )),
            (Column::TimestampTz(col), PhysicalType::Utf8) => Ok(Column::String(
                col.values
                    .map_values_with(|v| Ok(v.to_rfc3339()), String::new())?,
            )),
            (Column::TimestampTz(col), PhysicalType::TimestampTz(tz)) => {
                Ok(Column::TimestampTz(TimestampTzColumn {
                    values: col
                        .values
                        .map_values_with(|v| Ok(v.with_timezone(&tz)), epoch_in(tz))?,
                    tz,
                }))
            }

            (_, to) => Err(Error::Cast(format!(
                "cannot cast {} to {}",
                self.physical_type(),
                to
            ))),
        }
    }
}

fn parse_i64(value: &str) -> Result<i64> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| Error::Cast(format!("cannot parse \"{}\" as int64", value)))
}

fn parse_f64(value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| Error::Cast(format!("cannot parse \"{}\" as float64", value)))
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" => Ok(true),
        "false" | "f" | "0" => Ok(false),
        _ => Err(Error::Cast(format!("cannot parse \"{}\" as bool", value))),
    }
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| Error::Cast(format!("cannot parse \"{}\" as date", value)))
}

fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
    let trimmed = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.naive_utc());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(dt);
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        if let Some(dt) = d.and_hms_opt(0, 0, 0) {
            return Ok(dt);
        }
    }
    Err(Error::Cast(format!(
        "cannot parse \"{}\" as timestamp",
        value
    )))
}

fn parse_timestamp_tz(value: &str, tz: Tz) -> Result<DateTime<Tz>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value.trim()) {
        return Ok(dt.with_timezone(&tz));
    }
    // Fall back to naive formats, interpreting the value as wall time in `tz`.
    let naive = parse_timestamp(value)
        .map_err(|_| Error::Cast(format!("cannot parse \"{}\" as timestamp[{}]", value, tz)))?;
    tz.from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| Error::Cast(format!("\"{}\" is not a valid wall time in {}", value, tz)))
}

impl From<Int64Column> for Column {
    fn from(col: Int64Column) -> Self {
        Column::Int64(col)
    }
}

impl From<Float64Column> for Column {
    fn from(col: Float64Column) -> Self {
        Column::Float64(col)
    }
}

impl From<StringColumn> for Column {
    fn from(col: StringColumn) -> Self {
        Column::String(col)
    }
}

impl From<BooleanColumn> for Column {
    fn from(col: BooleanColumn) -> Self {
        Column::Boolean(col)
    }
}

impl From<DateColumn> for Column {
    fn from(col: DateColumn) -> Self {
        Column::Date(col)
    }
}

impl From<TimestampColumn> for Column {
    fn from(col: TimestampColumn) -> Self {
        Column::Timestamp(col)
    }
}

impl From<TimestampTzColumn> for Column {
    fn from(col: TimestampTzColumn) -> Self {
        Column::TimestampTz(col)
    }
}
