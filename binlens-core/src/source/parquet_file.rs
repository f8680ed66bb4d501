use super::ColumnSource;
use crate::sample::Sample;
use arrow::array::{Array, Float64Array};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use binlens_common::{BinLensError, Result};
use bytes::Bytes;
use memmap2::Mmap;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::{parquet_to_arrow_schema, ProjectionMask};
use parquet::file::reader::{FileReader, SerializedFileReader};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
    pub numeric: bool,
}

fn is_binnable(dt: &DataType) -> bool {
    matches!(
        dt,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float16
            | DataType::Float32
            | DataType::Float64
            | DataType::Decimal128(_, _)
            | DataType::Decimal256(_, _)
    )
}

/// Reads the footer only and reports each top-level column with its arrow type.
pub fn describe_columns(path: &Path) -> Result<Vec<ColumnInfo>> {
    let file = std::fs::File::open(path)?;
    // memory-map the file for zero-copy footer access
    let mmap: Mmap = unsafe { Mmap::map(&file)? };
    let bytes = Bytes::copy_from_slice(&mmap);
    let reader = SerializedFileReader::new(bytes)?;
    let file_meta = reader.metadata().file_metadata();
    let schema = parquet_to_arrow_schema(file_meta.schema_descr(), file_meta.key_value_metadata())?;
    Ok(schema
        .fields()
        .iter()
        .map(|f| ColumnInfo {
            name: f.name().clone(),
            data_type: format!("{}", f.data_type()),
            nullable: f.is_nullable(),
            numeric: is_binnable(f.data_type()),
        })
        .collect())
}

#[derive(Debug, Clone)]
pub struct ParquetColumnSource {
    path: PathBuf,
    batch_size: usize,
}

impl ParquetColumnSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            batch_size: 65536,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }
}

fn float_column(batch: &RecordBatch, name: &str) -> Result<Float64Array> {
    let col = batch
        .column_by_name(name)
        .ok_or_else(|| BinLensError::ColumnNotFound(name.to_owned()))?;
    let cast = arrow::compute::cast(col, &DataType::Float64)?;
    cast.as_any()
        .downcast_ref::<Float64Array>()
        .cloned()
        .ok_or_else(|| BinLensError::Other(format!("column '{name}' did not cast to Float64")))
}

impl ColumnSource for ParquetColumnSource {
    fn column_names(&self) -> Result<Vec<String>> {
        Ok(describe_columns(&self.path)?.into_iter().map(|c| c.name).collect())
    }

    fn numeric_columns(&self) -> Result<Vec<String>> {
        Ok(describe_columns(&self.path)?
            .into_iter()
            .filter(|c| c.numeric)
            .map(|c| c.name)
            .collect())
    }

    #[tracing::instrument(skip(self), fields(path = %self.path.display()))]
    fn paired_columns(&self, x: &str, y: &str) -> Result<Vec<Sample>> {
        let file = std::fs::File::open(&self.path)?;
        let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
        let schema = builder.schema().clone();
        let mut indices = Vec::with_capacity(2);
        for name in [x, y] {
            let idx = schema
                .fields()
                .iter()
                .position(|f| f.name() == name)
                .ok_or_else(|| BinLensError::ColumnNotFound(name.to_owned()))?;
            let dt = schema.field(idx).data_type();
            if !is_binnable(dt) {
                return Err(BinLensError::InvalidInput(format!(
                    "column '{name}' has non-numeric type {dt}"
                )));
            }
            if !indices.contains(&idx) {
                indices.push(idx);
            }
        }
        let mask = ProjectionMask::roots(builder.parquet_schema(), indices);
        let reader = builder
            .with_projection(mask)
            .with_batch_size(self.batch_size)
            .build()?;

        let mut samples = Vec::new();
        let mut skipped = 0usize;
        for batch in reader {
            let batch = batch?;
            let xs = float_column(&batch, x)?;
            let ys = float_column(&batch, y)?;
            for row in 0..batch.num_rows() {
                if xs.is_null(row) || ys.is_null(row) {
                    skipped += 1;
                    continue;
                }
                samples.push(Sample::new(xs.value(row), ys.value(row)));
            }
        }
        if skipped > 0 {
            warn!(x, y, skipped, "skipped rows with a null cell");
        }
        debug!(rows = samples.len(), "read paired columns");
        Ok(samples)
    }
}
