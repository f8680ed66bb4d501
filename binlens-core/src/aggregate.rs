use crate::range::{BinEdges, BoundaryPolicy};
use crate::sample::SortedSamples;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BinStats {
    pub count: u64,
    pub sum: f64,
    pub frequency: f64, // count / total, 0 when total is 0
    pub average: f64,   // sum / count, exactly 0 for an empty bin
}

impl BinStats {
    fn new(count: u64, sum: f64, total: u64) -> Self {
        Self {
            count,
            sum,
            frequency: if total > 0 { count as f64 / total as f64 } else { 0.0 },
            average: if count > 0 { sum / count as f64 } else { 0.0 },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Histogram {
    pub bins: Vec<BinStats>,
    pub total: u64,
    /// Samples outside every bin, e.g. the top edge under [`BoundaryPolicy::HalfOpen`].
    pub unassigned: u64,
}

impl Histogram {
    pub fn counts(&self) -> Vec<u64> {
        self.bins.iter().map(|b| b.count).collect()
    }
    pub fn frequencies(&self) -> Vec<f64> {
        self.bins.iter().map(|b| b.frequency).collect()
    }
    pub fn sums(&self) -> Vec<f64> {
        self.bins.iter().map(|b| b.sum).collect()
    }
    pub fn averages(&self) -> Vec<f64> {
        self.bins.iter().map(|b| b.average).collect()
    }
}

/// Assigns sorted samples to bins in a single forward sweep.
///
/// The cursor only moves forward, so the whole pass is O(n + bins). Samples
/// below the first edge are skipped and reported as unassigned rather than
/// stalling the sweep.
pub fn aggregate(samples: &SortedSamples, edges: &BinEdges, boundary: BoundaryPolicy) -> Histogram {
    let keys = samples.keys();
    let data = samples.samples();
    let bounds = edges.as_slice();
    let total = samples.len() as u64;
    let n_bins = edges.bin_count();

    let mut cursor = 0usize;
    while cursor < keys.len() && keys[cursor] < bounds[0] {
        cursor += 1;
    }

    let mut bins = Vec::with_capacity(n_bins);
    let mut assigned = 0u64;
    for i in 0..n_bins {
        let (lower, upper) = (bounds[i], bounds[i + 1]);
        let closed = boundary == BoundaryPolicy::ClosedLast && i + 1 == n_bins;
        let mut count = 0u64;
        let mut sum = 0.0;
        while cursor < keys.len() {
            let key = keys[cursor];
            let inside = key >= lower && (key < upper || (closed && key == upper));
            if !inside {
                break;
            }
            sum += data[cursor].y;
            count += 1;
            cursor += 1;
        }
        assigned += count;
        bins.push(BinStats::new(count, sum, total));
    }

    let unassigned = total - assigned;
    if unassigned > 0 {
        debug!(unassigned, total, ?boundary, "samples fell outside every bin");
    }
    Histogram { bins, total, unassigned }
}
