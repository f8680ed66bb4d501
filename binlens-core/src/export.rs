use crate::series::ChartSeries;
use arrow::array::{ArrayRef, Float64Array, StringArray, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use binlens_common::Result;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

// --- headless summary output ---

pub fn print_summary(series: &ChartSeries) {
    if let Some(x) = &series.independent_label {
        println!("{:<16} {}", "Column:", x);
    }
    println!("{:<16} {}", "Measure:", series.dependent_label);
    println!("{:<16} {}", "Samples:", series.total);
    println!("{:<16} {}", "Bins:", series.bin_count());
    if let Some(interval) = series.interval {
        println!("{:<16} {}", "Interval:", interval.normalize());
    }
    if let (Some(lo), Some(hi)) = (series.edge_labels.first(), series.edge_labels.last()) {
        println!("{:<16} {} .. {}", "Axis:", lo, hi);
    }
    if series.degenerate {
        println!("{:<16} all values identical, single bin", "Note:");
    }
    if series.unassigned > 0 {
        println!("{:<16} {}", "Unassigned:", series.unassigned);
    }
}

// --- table rendering ---

fn to_record_batch(series: &ChartSeries) -> Result<RecordBatch> {
    let dep = &series.dependent_label;
    let schema = Arc::new(Schema::new(vec![
        Field::new("range", DataType::Utf8, false),
        Field::new("count", DataType::UInt64, false),
        Field::new("frequency", DataType::Float64, false),
        Field::new(format!("{dep} (sum)"), DataType::Float64, false),
        Field::new(format!("{dep} (average)"), DataType::Float64, false),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(series.range_labels.clone())),
        Arc::new(UInt64Array::from(series.counts.clone())),
        Arc::new(Float64Array::from(series.frequencies.clone())),
        Arc::new(Float64Array::from(series.sums.clone())),
        Arc::new(Float64Array::from(series.averages.clone())),
    ];
    Ok(RecordBatch::try_new(schema, columns)?)
}

pub fn render_table(series: &ChartSeries) -> Result<String> {
    let batch = to_record_batch(series)?;
    Ok(arrow::util::pretty::pretty_format_batches(&[batch])?.to_string())
}

// --- JSON export ---

pub fn export_json(output_path: &Path, series: &[ChartSeries]) -> Result<()> {
    let doc = serde_json::json!({ "series": series });
    let mut file = std::fs::File::create(output_path)?;
    serde_json::to_writer_pretty(&mut file, &doc)?;
    Ok(())
}

// --- CSV export ---

fn csv_escape(raw: &str) -> String {
    // csv-escape: wrap in quotes if contains comma, quote, or newline
    if raw.contains(',') || raw.contains('"') || raw.contains('\n') {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

pub fn write_csv<W: Write>(out: &mut W, series: &[ChartSeries]) -> Result<()> {
    writeln!(out, "column,range,lower,upper,count,frequency,sum,average")?;
    for s in series {
        let column = csv_escape(s.independent_label.as_deref().unwrap_or(""));
        for i in 0..s.bin_count() {
            writeln!(
                out,
                "{},{},{},{},{},{},{},{}",
                column,
                csv_escape(&s.range_labels[i]),
                s.edge_labels[i],
                s.edge_labels[i + 1],
                s.counts[i],
                s.frequencies[i],
                s.sums[i],
                s.averages[i],
            )?;
        }
    }
    Ok(())
}

pub fn export_csv(output_path: &Path, series: &[ChartSeries]) -> Result<()> {
    let mut file = std::fs::File::create(output_path)?;
    write_csv(&mut file, series)
}
