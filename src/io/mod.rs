pub mod csv;
pub mod json;
#[cfg(feature = "parquet")]
pub mod parquet;

// Re-export commonly used functions
pub use self::csv::{read_csv, read_csv_from, write_csv, write_csv_to};
pub use self::json::{read_json, write_json};
#[cfg(feature = "parquet")]
pub use self::parquet::{read_parquet, write_parquet};
