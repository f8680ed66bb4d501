//! Bin-edge planning in exact decimal arithmetic.
//!
//! Every interval, bound and edge is a [`Decimal`]; binary floats only appear
//! again when the plan is handed to a renderer.

use binlens_common::{BinLensError, BinningConfig, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Largest number of bins a plan may hold.
pub const MAX_BIN_COUNT: usize = 1_000_000;

/// Smallest interval the planner emits: one unit in the 28th decimal place.
pub const MIN_INTERVAL: Decimal = Decimal::from_parts(1, 0, 0, false, 28);

/// Whether the final bin includes its upper edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BoundaryPolicy {
    /// Every bin is `[lo, hi)` except the last, which is `[lo, hi]`.
    #[default]
    ClosedLast,
    /// Every bin is `[lo, hi)`; a sample equal to the top edge is not counted.
    HalfOpen,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinningOptions {
    pub target_bin_count: usize,
    pub boundary: BoundaryPolicy,
    pub degenerate_width: Decimal,
}

impl Default for BinningOptions {
    fn default() -> Self {
        Self {
            target_bin_count: 10,
            boundary: BoundaryPolicy::ClosedLast,
            degenerate_width: Decimal::ONE,
        }
    }
}

impl From<&BinningConfig> for BinningOptions {
    fn from(cfg: &BinningConfig) -> Self {
        Self {
            target_bin_count: cfg.target_bin_count,
            boundary: if cfg.closed_last_bin {
                BoundaryPolicy::ClosedLast
            } else {
                BoundaryPolicy::HalfOpen
            },
            degenerate_width: cfg.degenerate_width,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisBounds {
    pub min: Decimal,
    pub max: Decimal,
}

/// Strictly increasing edges; `N + 1` edges describe `N` bins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Decimal>", into = "Vec<Decimal>")]
pub struct BinEdges(Vec<Decimal>);

impl TryFrom<Vec<Decimal>> for BinEdges {
    type Error = BinLensError;

    fn try_from(edges: Vec<Decimal>) -> Result<Self> {
        Self::new(edges)
    }
}

impl From<BinEdges> for Vec<Decimal> {
    fn from(edges: BinEdges) -> Self {
        edges.0
    }
}

impl BinEdges {
    /// Accepts any strictly increasing sequence of at least two edges.
    pub fn new(edges: Vec<Decimal>) -> Result<Self> {
        if edges.len() < 2 {
            return Err(BinLensError::InvalidInput(format!(
                "need at least 2 edges, got {}",
                edges.len()
            )));
        }
        if edges.windows(2).any(|w| w[0] >= w[1]) {
            return Err(BinLensError::InvalidInput("edges must be strictly increasing".into()));
        }
        Ok(Self(edges))
    }

    pub fn as_slice(&self) -> &[Decimal] {
        &self.0
    }

    pub fn bin_count(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    pub fn first(&self) -> Decimal {
        self.0[0]
    }

    pub fn last(&self) -> Decimal {
        self.0[self.0.len() - 1]
    }

    pub fn to_f64(&self) -> Vec<f64> {
        self.0.iter().map(|d| d.to_f64().unwrap_or(f64::NAN)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangePlan {
    pub data_min: Decimal,
    pub data_max: Decimal,
    pub interval: Decimal,
    pub bounds: AxisBounds,
    pub edges: BinEdges,
    pub degenerate: bool, // every value identical, single fallback bin
}

impl RangePlan {
    pub fn bin_count(&self) -> usize {
        self.edges.bin_count()
    }
}

fn overflow(what: &str) -> BinLensError {
    BinLensError::InvalidInput(format!("decimal overflow while computing {what}"))
}

/// Plans bin edges for an ascending sequence of independent values.
///
/// Intervals wider than 2 are rounded up to a whole number; narrower ones keep
/// the exact quotient, floored at [`MIN_INTERVAL`]. Bounds are snapped outward
/// to multiples of the interval. A plan needing more than [`MAX_BIN_COUNT`]
/// bins is rejected before any edge is allocated.
#[tracing::instrument(skip(sorted_values), fields(n = sorted_values.len()))]
pub fn plan_range(sorted_values: &[Decimal], options: &BinningOptions) -> Result<RangePlan> {
    let (Some(&data_min), Some(&data_max)) = (sorted_values.first(), sorted_values.last()) else {
        return Err(BinLensError::InvalidInput(
            "cannot plan bins for an empty sequence".into(),
        ));
    };
    if options.target_bin_count == 0 {
        return Err(BinLensError::InvalidInput("target bin count must be positive".into()));
    }
    if data_max < data_min {
        return Err(BinLensError::InvalidInput("values must be sorted ascending".into()));
    }
    let span = data_max.checked_sub(data_min).ok_or_else(|| overflow("span"))?;
    if span.is_zero() {
        return degenerate_plan(data_min, options.degenerate_width);
    }

    let interval = interval_for(span, options.target_bin_count)?;
    let bounds = snap_bounds(data_min, data_max, interval)?;
    let edges = build_edges(bounds, data_max, interval)?;
    debug!(
        %interval,
        axis_min = %bounds.min,
        axis_max = %bounds.max,
        bins = edges.bin_count(),
        "planned range"
    );
    Ok(RangePlan {
        data_min,
        data_max,
        interval,
        bounds,
        edges,
        degenerate: false,
    })
}

fn interval_for(span: Decimal, target_bin_count: usize) -> Result<Decimal> {
    let raw = span
        .checked_div(Decimal::from(target_bin_count))
        .ok_or_else(|| overflow("interval"))?;
    let interval = if raw > Decimal::TWO { raw.ceil() } else { raw.normalize() };
    // quotients below decimal resolution round to zero
    Ok(interval.max(MIN_INTERVAL))
}

fn snap_bounds(data_min: Decimal, data_max: Decimal, interval: Decimal) -> Result<AxisBounds> {
    let mut min = data_min
        .checked_div(interval)
        .map(|q| q.floor())
        .and_then(|q| q.checked_mul(interval))
        .ok_or_else(|| overflow("axis minimum"))?;
    // quotients are rounded at 28 digits; keep the bound outside the data
    if min > data_min {
        min = min.checked_sub(interval).ok_or_else(|| overflow("axis minimum"))?;
    }
    let mut max = data_max
        .checked_div(interval)
        .map(|q| q.ceil())
        .and_then(|q| q.checked_mul(interval))
        .ok_or_else(|| overflow("axis maximum"))?;
    if max < data_max {
        max = max.checked_add(interval).ok_or_else(|| overflow("axis maximum"))?;
    }
    Ok(AxisBounds {
        min: min.normalize(),
        max: max.normalize(),
    })
}

fn build_edges(bounds: AxisBounds, data_max: Decimal, interval: Decimal) -> Result<BinEdges> {
    let count = bounds
        .max
        .checked_sub(bounds.min)
        .and_then(|width| width.checked_div(interval))
        .map(|q| q.ceil())
        .ok_or_else(|| overflow("bin count"))?;
    let expected = count
        .to_usize()
        .filter(|&n| n <= MAX_BIN_COUNT)
        .ok_or_else(|| {
            BinLensError::InvalidInput(format!(
                "{count} bins of width {interval} exceeds the limit of {MAX_BIN_COUNT}"
            ))
        })?;
    // the snapped span holds `expected` intervals; one more absorbs rounding
    let limit = expected + 1;
    let mut edges = Vec::with_capacity(expected + 2);
    let mut counter = 0usize;
    loop {
        let edge = Decimal::from(counter)
            .checked_mul(interval)
            .and_then(|step| bounds.min.checked_add(step))
            .ok_or_else(|| overflow("bin edges"))?;
        if edge >= data_max {
            break;
        }
        edges.push(edge.normalize());
        counter += 1;
        if counter > limit {
            return Err(BinLensError::Other(format!(
                "bin count derivation exceeded {limit} bins (interval {interval})"
            )));
        }
    }
    edges.push(bounds.max);
    BinEdges::new(edges)
}

fn degenerate_plan(value: Decimal, width: Decimal) -> Result<RangePlan> {
    if width <= Decimal::ZERO {
        return Err(BinLensError::InvalidInput(format!(
            "degenerate bin width must be positive, got {width}"
        )));
    }
    let upper = value.checked_add(width).ok_or_else(|| overflow("degenerate bin"))?;
    debug!(%value, %width, "zero-span data, using a single bin");
    Ok(RangePlan {
        data_min: value,
        data_max: value,
        interval: width,
        bounds: AxisBounds { min: value, max: upper },
        edges: BinEdges::new(vec![value, upper])?,
        degenerate: true,
    })
}
