pub mod common;
pub mod value_column;

pub use common::{Column, PhysicalType};
pub use value_column::{
    BooleanColumn, DateColumn, Float64Column, Int64Column, StringColumn, TimestampColumn,
    TimestampTzColumn, ValueColumn,
};
