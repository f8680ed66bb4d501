use crate::range::BinningOptions;
use crate::series::{bin_samples_or_empty, ChartSeries};
use crate::source::ColumnSource;
use binlens_common::Result;
use rayon::prelude::*;
use tracing::warn;

/// Bins every independent column against the same dependent column.
///
/// Columns are independent pure computations, so they run on the rayon pool.
/// Output order matches `x_columns`.
pub fn bin_columns<S>(
    source: &S,
    x_columns: &[String],
    y_column: &str,
    options: &BinningOptions,
    label_precision: Option<u32>,
) -> Result<Vec<ChartSeries>>
where
    S: ColumnSource + Sync + ?Sized,
{
    x_columns
        .par_iter()
        .map(|x| {
            let samples = source.paired_columns(x, y_column)?;
            if samples.is_empty() {
                warn!(column = %x, "no complete rows, emitting an empty series");
            }
            let series = bin_samples_or_empty(&samples, options, y_column, label_precision)?;
            Ok(series.with_independent_label(x.clone()))
        })
        .collect()
}
