pub mod aggregate;
pub mod export;
pub mod parallel;
pub mod range;
pub mod sample;
pub mod series;
pub mod source;

pub use aggregate::{aggregate, BinStats, Histogram};
pub use binlens_common::{BinLensError, Result};
pub use export::{export_csv, export_json, print_summary, render_table, write_csv};
pub use parallel::bin_columns;
pub use range::{plan_range, AxisBounds, BinEdges, BinningOptions, BoundaryPolicy, RangePlan};
pub use sample::{to_decimal, Sample, SortedSamples};
pub use series::{bin_samples, bin_samples_or_empty, ChartSeries};
pub use source::{
    describe_columns, open_source, ColumnInfo, ColumnSource, JsonColumnSource, ParquetColumnSource,
};
