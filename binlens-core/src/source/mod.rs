pub mod json;
pub mod parquet_file;

pub use self::json::JsonColumnSource;
pub use self::parquet_file::{describe_columns, ColumnInfo, ParquetColumnSource};

use crate::sample::Sample;
use binlens_common::Result;
use std::path::Path;

/// Tabular data that can hand out an (independent, dependent) column pair.
pub trait ColumnSource {
    fn column_names(&self) -> Result<Vec<String>>;

    /// Columns whose every non-null cell is a number.
    fn numeric_columns(&self) -> Result<Vec<String>>;

    /// Row-aligned samples; rows with a missing cell in either column are skipped.
    fn paired_columns(&self, x: &str, y: &str) -> Result<Vec<Sample>>;
}

/// Picks a source by file extension: `.parquet` or a JSON column map.
pub fn open_source(path: &Path) -> Result<Box<dyn ColumnSource + Send + Sync>> {
    let is_parquet = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("parquet"));
    if is_parquet {
        Ok(Box::new(ParquetColumnSource::new(path)))
    } else {
        Ok(Box::new(JsonColumnSource::from_path(path)?))
    }
}
