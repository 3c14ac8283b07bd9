//! Schema-typed dataframes.
//!
//! A [`TypedFrame`] pairs a raw column-oriented [`DataFrame`] with a declared
//! [`Schema`] mapping each column name to a physical representation plus
//! nullability and uniqueness constraints. Every relational operation —
//! assignment, filtering, renaming, dropping, joining, grouping — derives the
//! result's schema through an explicit schema algebra and delegates the data
//! transform to the engine, so the types you declared keep tracking the data
//! you hold.
//!
//! ```
//! use typedframe::{int64, unique, utf8, Column, DataFrame, TypedFrame};
//!
//! let df = DataFrame::from_columns([
//!     ("id", Column::int64(vec![1, 2, 3])),
//!     ("name", Column::utf8(vec!["a", "b", "c"])),
//! ])
//! .unwrap();
//!
//! let frame = TypedFrame::new(df, [("id", unique(int64())), ("name", utf8())])
//!     .validate(true)
//!     .unwrap();
//! assert_eq!(frame.row_count(), 3);
//! ```

pub mod aggregations;
pub mod column;
pub mod error;
pub mod frame;
pub mod io;
pub mod schema;
pub mod typed_frame;

// Re-export core types
pub use aggregations::{AggregateExpr, Aggregation};
pub use column::{
    BooleanColumn, Column, DateColumn, Float64Column, Int64Column, PhysicalType, StringColumn,
    TimestampColumn, TimestampTzColumn,
};
pub use error::{Error, Result};
pub use frame::{DataFrame, DropNaHow, GroupBy, JoinType, Reduction};
pub use schema::types::{
    boolean, date, float64, int64, not_unique, nullable, timestamp, timestamp_tz, unique, utf8,
};
pub use schema::{merge_schemas, ColumnType, DropBehavior, Schema};
pub use typed_frame::{Cardinality, MergeOptions, TypedFrame};
