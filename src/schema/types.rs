use std::fmt;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::column::PhysicalType;

/// One column's declared type: a physical representation plus nullability and
/// uniqueness constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnType {
    pub representation: PhysicalType,
    pub nullable: bool,
    pub unique: bool,
}

impl ColumnType {
    /// A non-nullable, non-unique column of the given representation
    pub fn new(representation: PhysicalType) -> Self {
        Self {
            representation,
            nullable: false,
            unique: false,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.representation)?;
        if self.nullable {
            write!(f, "?")?;
        }
        if self.unique {
            write!(f, " unique")?;
        }
        Ok(())
    }
}

pub fn int64() -> ColumnType {
    ColumnType::new(PhysicalType::Int64)
}

pub fn float64() -> ColumnType {
    ColumnType::new(PhysicalType::Float64)
}

pub fn utf8() -> ColumnType {
    ColumnType::new(PhysicalType::Utf8)
}

pub fn boolean() -> ColumnType {
    ColumnType::new(PhysicalType::Boolean)
}

pub fn date() -> ColumnType {
    ColumnType::new(PhysicalType::Date)
}

pub fn timestamp() -> ColumnType {
    ColumnType::new(PhysicalType::Timestamp)
}

/// Timestamp carrying a concrete timezone, e.g. `timestamp_tz(Tz::UTC)`
pub fn timestamp_tz(tz: Tz) -> ColumnType {
    ColumnType::new(PhysicalType::TimestampTz(tz))
}

/// Copy of the type with the unique flag set
pub fn unique(column_type: ColumnType) -> ColumnType {
    ColumnType {
        unique: true,
        ..column_type
    }
}

/// Copy of the type with the unique flag cleared
pub fn not_unique(column_type: ColumnType) -> ColumnType {
    ColumnType {
        unique: false,
        ..column_type
    }
}

/// Copy of the type with the nullable flag set
pub fn nullable(column_type: ColumnType) -> ColumnType {
    ColumnType {
        nullable: true,
        ..column_type
    }
}
