use arrow::array::{Float64Array, Int32Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use binlens_core::{
    bin_columns, bin_samples, describe_columns, open_source, BinLensError, BinningOptions,
    BoundaryPolicy, ColumnSource, ParquetColumnSource, Sample,
};
use parquet::arrow::ArrowWriter;
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

fn write_fixture() -> NamedTempFile {
    let tmp = tempfile::Builder::new()
        .suffix(".parquet")
        .tempfile()
        .unwrap();
    let schema = Arc::new(Schema::new(vec![
        Field::new("age", DataType::Int32, true),
        Field::new("deposit", DataType::Float64, true),
        Field::new("job", DataType::Utf8, true),
    ]));
    let ages = Arc::new(Int32Array::from(vec![Some(20), Some(30), None, Some(40), Some(120)]));
    let deposits = Arc::new(Float64Array::from(vec![
        Some(1.0),
        Some(3.0),
        Some(9.0),
        None,
        Some(5.0),
    ]));
    let jobs = Arc::new(StringArray::from(vec![
        Some("admin"),
        Some("services"),
        None,
        Some("retired"),
        Some("admin"),
    ]));
    let batch = RecordBatch::try_new(schema.clone(), vec![ages, deposits, jobs]).unwrap();
    let mut writer = ArrowWriter::try_new(tmp.as_file(), schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
    tmp
}

fn write_json(content: &str) -> NamedTempFile {
    let mut tmp = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    tmp.write_all(content.as_bytes()).unwrap();
    tmp.flush().unwrap();
    tmp
}

#[test]
fn describe_columns_flags_numeric_types() {
    let tmp = write_fixture();
    let cols = describe_columns(tmp.path()).unwrap();
    assert_eq!(cols.len(), 3);
    assert_eq!(cols[0].name, "age");
    assert!(cols[0].numeric);
    assert!(cols[1].numeric);
    assert!(!cols[2].numeric);
}

#[test]
fn parquet_pairs_skip_null_rows() {
    let tmp = write_fixture();
    let source = ParquetColumnSource::new(tmp.path());
    let samples = source.paired_columns("age", "deposit").unwrap();
    assert_eq!(
        samples,
        vec![Sample::new(20.0, 1.0), Sample::new(30.0, 3.0), Sample::new(120.0, 5.0)]
    );
}

#[test]
fn parquet_rejects_text_and_unknown_columns() {
    let tmp = write_fixture();
    let source = ParquetColumnSource::new(tmp.path()).with_batch_size(2);
    assert!(matches!(
        source.paired_columns("job", "deposit"),
        Err(BinLensError::InvalidInput(_))
    ));
    assert!(matches!(
        source.paired_columns("salary", "deposit"),
        Err(BinLensError::ColumnNotFound(_))
    ));
    assert_eq!(source.numeric_columns().unwrap(), vec!["age", "deposit"]);
}

#[test]
fn same_column_on_both_axes() {
    let tmp = write_fixture();
    let samples = ParquetColumnSource::new(tmp.path())
        .paired_columns("deposit", "deposit")
        .unwrap();
    assert_eq!(samples.len(), 4);
    assert!(samples.iter().all(|s| s.x == s.y));
}

#[test]
fn parquet_end_to_end_series() {
    let tmp = write_fixture();
    let source = open_source(tmp.path()).unwrap();
    let series = bin_columns(
        &*source,
        &["age".to_string()],
        "deposit",
        &BinningOptions::default(),
        None,
    )
    .unwrap();
    let s = &series[0];
    // span 100 over 10 bins: interval 10, axis 20..120
    assert_eq!(s.edge_labels.first().unwrap(), "20");
    assert_eq!(s.edge_labels.last().unwrap(), "120");
    assert_eq!(s.bin_count(), 10);
    assert_eq!(s.counts[0], 1);
    assert_eq!(s.counts[1], 1);
    assert_eq!(s.counts[9], 1);
    assert_eq!(s.averages[9], 5.0);
    assert_eq!(s.total, 3);
}

#[test]
fn json_report_source_end_to_end() {
    let tmp = write_json(
        r#"{ "json_source": {
            "age": { "0": 1, "1": 2, "2": 3 },
            "balance": { "0": 0, "1": 500, "2": 1000 },
            "deposit": { "0": 10, "1": 20, "2": 30 }
        } }"#,
    );
    let source = open_source(tmp.path()).unwrap();
    let cols = vec!["age".to_string(), "balance".to_string()];
    let series = bin_columns(&*source, &cols, "deposit", &BinningOptions::default(), None).unwrap();
    assert_eq!(series[0].range_labels[0], "[1, 1.2)");
    assert_eq!(series[0].sums[0], 10.0);
    assert_eq!(series[1].range_labels[0], "[0, 100)");
    assert_eq!(series[1].bin_count(), 10);
    for s in &series {
        let freq: f64 = s.frequencies.iter().sum();
        assert!((freq - 1.0).abs() < 1e-12);
    }
}

#[test]
fn last_bin_policy_is_explicit() {
    let samples = vec![Sample::new(0.0, 5.0), Sample::new(1000.0, 7.0)];
    let closed = bin_samples(&samples, &BinningOptions::default(), "y", None).unwrap();
    assert_eq!(closed.counts[9], 1);
    assert_eq!(closed.averages[9], 7.0);
    assert_eq!(closed.unassigned, 0);

    let opts = BinningOptions { boundary: BoundaryPolicy::HalfOpen, ..Default::default() };
    let open = bin_samples(&samples, &opts, "y", None).unwrap();
    assert_eq!(open.counts[9], 0);
    assert_eq!(open.averages[9], 0.0);
    assert_eq!(open.unassigned, 1);
    assert_eq!(open.frequencies[0], 0.5);
}

#[test]
fn degenerate_column_reports_single_full_bin() {
    let samples: Vec<Sample> = (0..4).map(|i| Sample::new(0.0, i as f64)).collect();
    let s = bin_samples(&samples, &BinningOptions::default(), "y", None).unwrap();
    assert!(s.degenerate);
    assert_eq!(s.frequencies, vec![1.0]);
    assert_eq!(s.averages, vec![1.5]);
    assert_eq!(s.range_labels, vec!["[0, 1]"]);
}
