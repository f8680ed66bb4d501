pub mod config;
pub use config::{BinningConfig, Config, DisplayConfig, ExportConfig};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BinLensError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Config error: {0}")]
    Config(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Non-finite value in column '{column}' at row {index}")]
    NonFinite { column: String, index: usize },
    #[error("Value {0} is outside the supported decimal range")]
    OutOfRange(f64),
    #[error("Column not found: {0}")]
    ColumnNotFound(String),
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, BinLensError>;
