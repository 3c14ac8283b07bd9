use std::fmt::Debug;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use chrono_tz::Tz;

use crate::column::common::utils;
use crate::error::{Error, Result};

/// Generic storage for one column: a contiguous value buffer plus an
/// optional null bitmask. Null slots hold a filler value and are only
/// distinguishable through the mask.
#[derive(Debug, Clone)]
pub struct ValueColumn<T> {
    pub(crate) data: Arc<[T]>,
    pub(crate) null_mask: Option<Arc<[u8]>>,
}

/// Column of 64-bit integers
pub type Int64Column = ValueColumn<i64>;
/// Column of 64-bit floats
pub type Float64Column = ValueColumn<f64>;
/// Column of UTF-8 strings
pub type StringColumn = ValueColumn<String>;
/// Column of booleans
pub type BooleanColumn = ValueColumn<bool>;
/// Column of calendar dates
pub type DateColumn = ValueColumn<NaiveDate>;
/// Column of naive timestamps
pub type TimestampColumn = ValueColumn<NaiveDateTime>;

impl<T: Clone + Debug> ValueColumn<T> {
    /// Create a column with no nulls
    pub fn new(data: Vec<T>) -> Self {
        Self {
            data: data.into(),
            null_mask: None,
        }
    }

    /// Create a column with per-row null flags
    pub fn with_nulls(data: Vec<T>, nulls: Vec<bool>) -> Self {
        let null_mask = if nulls.iter().any(|&is_null| is_null) {
            Some(utils::create_bitmask(&nulls))
        } else {
            None
        };

        Self {
            data: data.into(),
            null_mask,
        }
    }

    /// Create a column from optional values, filling null slots with `filler`
    pub(crate) fn from_options_with(values: Vec<Option<T>>, filler: T) -> Self {
        let mut data = Vec::with_capacity(values.len());
        let mut nulls = Vec::with_capacity(values.len());
        for value in values {
            match value {
                Some(v) => {
                    data.push(v);
                    nulls.push(false);
                }
                None => {
                    data.push(filler.clone());
                    nulls.push(true);
                }
            }
        }
        Self::with_nulls(data, nulls)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the value at the given index, `None` when null
    pub fn get(&self, index: usize) -> Result<Option<&T>> {
        if index >= self.data.len() {
            return Err(Error::IndexOutOfBounds {
                index,
                size: self.data.len(),
            });
        }

        if self.is_null(index) {
            return Ok(None);
        }

        Ok(Some(&self.data[index]))
    }

    /// Whether the value at the given index is null (out of range counts as null)
    pub fn is_null(&self, index: usize) -> bool {
        if index >= self.data.len() {
            return true;
        }
        match &self.null_mask {
            Some(mask) => utils::is_set(mask, index),
            None => false,
        }
    }

    /// Number of null values in the column
    pub fn null_count(&self) -> usize {
        match &self.null_mask {
            Some(mask) => (0..self.data.len())
                .filter(|&i| utils::is_set(mask, i))
                .count(),
            None => 0,
        }
    }

    /// Iterate values in order, `None` for nulls
    pub fn iter(&self) -> impl Iterator<Item = Option<&T>> + '_ {
        (0..self.data.len()).map(move |i| {
            if self.is_null(i) {
                None
            } else {
                Some(&self.data[i])
            }
        })
    }

    /// Gather rows by index; `None` entries produce nulls
    pub(crate) fn take_with(&self, indices: &[Option<usize>], filler: T) -> Self {
        let mut data = Vec::with_capacity(indices.len());
        let mut nulls = Vec::with_capacity(indices.len());
        for idx in indices {
            match idx {
                Some(i) if !self.is_null(*i) => {
                    data.push(self.data[*i].clone());
                    nulls.push(false);
                }
                _ => {
                    data.push(filler.clone());
                    nulls.push(true);
                }
            }
        }
        Self::with_nulls(data, nulls)
    }

    /// Apply a fallible conversion to every non-null value, keeping nulls
    pub(crate) fn map_values_with<U, F>(&self, f: F, filler: U) -> Result<ValueColumn<U>>
    where
        U: Clone + Debug,
        F: Fn(&T) -> Result<U>,
    {
        let mut data = Vec::with_capacity(self.data.len());
        let mut nulls = Vec::with_capacity(self.data.len());
        for i in 0..self.data.len() {
            if self.is_null(i) {
                data.push(filler.clone());
                nulls.push(true);
            } else {
                data.push(f(&self.data[i])?);
                nulls.push(false);
            }
        }
        Ok(ValueColumn::with_nulls(data, nulls))
    }

    /// Value-wise fallback: each null in `self` is replaced by the value of
    /// `other` at the same index
    pub(crate) fn coalesce(&self, other: &Self) -> Result<Self> {
        if self.len() != other.len() {
            return Err(Error::InconsistentRowCount {
                expected: self.len(),
                found: other.len(),
            });
        }
        let mut data = Vec::with_capacity(self.len());
        let mut nulls = Vec::with_capacity(self.len());
        for i in 0..self.len() {
            if !self.is_null(i) {
                data.push(self.data[i].clone());
                nulls.push(false);
            } else if !other.is_null(i) {
                data.push(other.data[i].clone());
                nulls.push(false);
            } else {
                data.push(self.data[i].clone());
                nulls.push(true);
            }
        }
        Ok(Self::with_nulls(data, nulls))
    }
}

impl<T: Clone + Debug + Default> ValueColumn<T> {
    /// Create a column from optional values
    pub fn from_options(values: Vec<Option<T>>) -> Self {
        Self::from_options_with(values, T::default())
    }

    /// Gather rows by index; `None` entries produce nulls
    pub fn take(&self, indices: &[Option<usize>]) -> Self {
        self.take_with(indices, T::default())
    }
}

impl<T: Clone + Debug + PartialOrd> ValueColumn<T> {
    /// Compare the non-null values at two indices
    pub fn compare_values(&self, a: usize, b: usize) -> Option<std::cmp::Ordering> {
        match (self.is_null(a), self.is_null(b)) {
            (false, false) => self.data[a].partial_cmp(&self.data[b]),
            _ => None,
        }
    }
}

impl<T: Clone + Debug + std::fmt::Display> ValueColumn<T> {
    /// Render the value at the given index, `None` when null or out of range
    pub fn format_value(&self, index: usize) -> Option<String> {
        if index >= self.data.len() || self.is_null(index) {
            return None;
        }
        Some(self.data[index].to_string())
    }
}

/// Column of timezone-qualified timestamps. The timezone is part of the
/// column's physical type, so an empty column still knows it.
#[derive(Debug, Clone)]
pub struct TimestampTzColumn {
    pub(crate) values: ValueColumn<DateTime<Tz>>,
    pub(crate) tz: Tz,
}

impl TimestampTzColumn {
    pub fn new(tz: Tz, data: Vec<DateTime<Tz>>) -> Self {
        Self {
            values: ValueColumn::new(data),
            tz,
        }
    }

    pub fn with_nulls(tz: Tz, data: Vec<DateTime<Tz>>, nulls: Vec<bool>) -> Self {
        Self {
            values: ValueColumn::with_nulls(data, nulls),
            tz,
        }
    }

    pub fn from_options(tz: Tz, values: Vec<Option<DateTime<Tz>>>) -> Self {
        Self {
            values: ValueColumn::from_options_with(values, epoch_in(tz)),
            tz,
        }
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<Option<&DateTime<Tz>>> {
        self.values.get(index)
    }

    pub fn is_null(&self, index: usize) -> bool {
        self.values.is_null(index)
    }

    pub fn null_count(&self) -> usize {
        self.values.null_count()
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&DateTime<Tz>>> + '_ {
        self.values.iter()
    }

    pub fn take(&self, indices: &[Option<usize>]) -> Self {
        Self {
            values: self.values.take_with(indices, epoch_in(self.tz)),
            tz: self.tz,
        }
    }

    pub fn compare_values(&self, a: usize, b: usize) -> Option<std::cmp::Ordering> {
        self.values.compare_values(a, b)
    }

    /// RFC 3339 rendering, `None` when null
    pub fn format_value(&self, index: usize) -> Option<String> {
        if self.is_null(index) || index >= self.len() {
            return None;
        }
        Some(self.values.data[index].to_rfc3339())
    }

    pub(crate) fn coalesce(&self, other: &Self) -> Result<Self> {
        Ok(Self {
            values: self.values.coalesce(&other.values)?,
            tz: self.tz,
        })
    }
}

pub(crate) fn epoch_in(tz: Tz) -> DateTime<Tz> {
    DateTime::UNIX_EPOCH.with_timezone(&tz)
}
