// Column-oriented dataframe engine: storage, row operations, join, group-by.
pub mod core;
pub mod group;
pub mod join;
pub mod row_ops;

pub use self::core::DataFrame;
pub use self::group::{GroupBy, Reduction};
pub use self::join::JoinType;
pub use self::row_ops::DropNaHow;
