use crate::aggregate::{aggregate, Histogram};
use crate::range::{plan_range, BinningOptions, BoundaryPolicy, RangePlan};
use crate::sample::{Sample, SortedSamples};
use binlens_common::Result;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Parallel arrays handed to a chart renderer: a category axis of edges, a bar
/// series of frequencies and line series of sums and averages.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChartSeries {
    pub independent_label: Option<String>,
    pub dependent_label: String,
    pub edges: Vec<f64>,
    pub edge_labels: Vec<String>,
    pub range_labels: Vec<String>,
    pub counts: Vec<u64>,
    pub frequencies: Vec<f64>,
    pub sums: Vec<f64>,
    pub averages: Vec<f64>,
    pub interval: Option<Decimal>,
    pub degenerate: bool,
    pub closed_last_bin: bool,
    pub total: u64,
    pub unassigned: u64,
}

impl ChartSeries {
    pub fn build(
        plan: &RangePlan,
        histogram: &Histogram,
        boundary: BoundaryPolicy,
        dependent_label: &str,
        label_precision: Option<u32>,
    ) -> Self {
        let edge_labels = label_edges(plan.edges.as_slice(), label_precision);
        let closed_last_bin = boundary == BoundaryPolicy::ClosedLast;
        let n = plan.bin_count();
        let range_labels = (0..n)
            .map(|i| {
                let close = if closed_last_bin && i + 1 == n { ']' } else { ')' };
                format!("[{}, {}{close}", edge_labels[i], edge_labels[i + 1])
            })
            .collect();
        Self {
            independent_label: None,
            dependent_label: capitalize(dependent_label),
            edges: plan.edges.to_f64(),
            edge_labels,
            range_labels,
            counts: histogram.counts(),
            frequencies: histogram.frequencies(),
            sums: histogram.sums(),
            averages: histogram.averages(),
            interval: Some(plan.interval),
            degenerate: plan.degenerate,
            closed_last_bin,
            total: histogram.total,
            unassigned: histogram.unassigned,
        }
    }

    /// Series for a dataset with no rows: no bins, nothing to divide.
    pub fn empty(dependent_label: &str) -> Self {
        Self {
            dependent_label: capitalize(dependent_label),
            ..Default::default()
        }
    }

    pub fn with_dependent_label(mut self, label: &str) -> Self {
        self.dependent_label = capitalize(label);
        self
    }

    pub fn with_independent_label(mut self, label: impl Into<String>) -> Self {
        self.independent_label = Some(label.into());
        self
    }

    pub fn bin_count(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Rounded labels, or exact ones when rounding would merge two adjacent edges.
fn label_edges(edges: &[Decimal], precision: Option<u32>) -> Vec<String> {
    let labels: Vec<String> = edges.iter().map(|e| format_edge(*e, precision)).collect();
    if precision.is_some() && labels.windows(2).any(|w| w[0] == w[1]) {
        debug!(?precision, "label precision too coarse for these edges, using exact labels");
        return edges.iter().map(|e| format_edge(*e, None)).collect();
    }
    labels
}

fn format_edge(edge: Decimal, precision: Option<u32>) -> String {
    match precision {
        Some(dp) => edge.round_dp(dp).normalize().to_string(),
        None => edge.normalize().to_string(),
    }
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Sort, plan and aggregate in one call.
#[tracing::instrument(skip(samples), fields(n = samples.len()))]
pub fn bin_samples(
    samples: &[Sample],
    options: &BinningOptions,
    dependent_label: &str,
    label_precision: Option<u32>,
) -> Result<ChartSeries> {
    let sorted = SortedSamples::new(samples)?;
    let plan = plan_range(sorted.keys(), options)?;
    let histogram = aggregate(&sorted, &plan.edges, options.boundary);
    Ok(ChartSeries::build(
        &plan,
        &histogram,
        options.boundary,
        dependent_label,
        label_precision,
    ))
}

/// Like [`bin_samples`] but an empty input yields [`ChartSeries::empty`].
pub fn bin_samples_or_empty(
    samples: &[Sample],
    options: &BinningOptions,
    dependent_label: &str,
    label_precision: Option<u32>,
) -> Result<ChartSeries> {
    if samples.is_empty() {
        return Ok(ChartSeries::empty(dependent_label));
    }
    bin_samples(samples, options, dependent_label, label_precision)
}
